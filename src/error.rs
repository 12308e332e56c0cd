//! Top-level error taxonomy for a seeding run.
//!
//! Backends and providers report `anyhow` errors with context; the
//! pipeline maps each failure into exactly one [`SeedError`] variant at
//! the point where it happens. None of them are recovered locally.

use shop_seeder_core::generation::GenerationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    /// Missing or invalid configuration; nothing was started.
    #[error("configuration error: {0:#}")]
    Config(anyhow::Error),

    /// Database unreachable or ping failed; nothing was modified.
    #[error("database connectivity check failed: {0:#}")]
    Connectivity(anyhow::Error),

    /// The model call failed or its output was rejected.
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// Index check, clear, embedding, or write failed.
    #[error("store error: {0:#}")]
    Store(anyhow::Error),
}

impl SeedError {
    /// Stable label for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            SeedError::Config(_) => "config",
            SeedError::Connectivity(_) => "connectivity",
            SeedError::Generation(_) => "generation",
            SeedError::Store(_) => "store",
        }
    }
}

pub type SeedResult<T> = Result<T, SeedError>;
