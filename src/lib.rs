//! # Shop Seeder
//!
//! Seeds a document database with one AI-generated grocery store and a
//! vector embedding of its summary, ready for similarity search.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌──────────┐   ┌──────────┐   ┌──────────┐
//! │   Ping   │──▶│  Generate  │──▶│ Summarize│──▶│  Embed   │──▶│  Insert  │
//! │ (store)  │   │ (LLM+schema│   │  (pure)  │   │ (model)  │   │ (store)  │
//! └──────────┘   └────────────┘   └──────────┘   └──────────┘   └──────────┘
//! ```
//!
//! The collection is cleared between the ping and generation. Model
//! output is validated against the shop schema and rejected, never
//! repaired, when it does not conform.
//!
//! ## Quick Start
//!
//! ```bash
//! export MONGODB_ATLAS_URI=...  GOOGLE_API_KEY=...
//! shop-seed ping                # connectivity check only
//! shop-seed preview             # generate + summarize, no writes
//! shop-seed                     # full seeding run
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and environment secrets |
//! | [`error`] | Top-level error taxonomy |
//! | [`llm`] | Text-generation providers (Gemini, OpenAI) |
//! | [`embedding`] | Embedding providers (Gemini, OpenAI, local) |
//! | [`store`] | Store backend selection |
//! | [`atlas_store`] | MongoDB Atlas backend |
//! | [`sqlite_store`] | SQLite backend |
//! | [`migrate`] | SQLite schema and index registration |
//! | [`ping`] | Connectivity check |
//! | [`seed`] | Pipeline orchestration |
//!
//! Schema, summary, generation, and the store/model traits live in
//! [`shop_seeder_core`].

pub mod atlas_store;
pub mod config;
pub mod db;
pub mod embedding;
pub mod error;
mod http;
pub mod llm;
pub mod logging;
pub mod migrate;
pub mod ping;
pub mod seed;
pub mod sqlite_store;
pub mod store;
