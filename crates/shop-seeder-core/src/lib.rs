//! # Shop Seeder Core
//!
//! I/O-free logic for shop-seeder: the shop record model, schema
//! parsing and validation, the summary builder, the structured
//! generator, and the traits behind which the language model, the
//! embedding model and the document store are injected.
//!
//! This crate contains no tokio, sqlx, HTTP or database client
//! dependencies. Concrete providers and store backends live in the
//! `shop-seeder` app crate.

pub mod embedding;
pub mod generation;
pub mod models;
pub mod schema;
pub mod store;
pub mod summary;
