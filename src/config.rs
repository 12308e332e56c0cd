//! TOML configuration and environment secrets.
//!
//! Every section has defaults, so a missing config file yields a usable
//! [`Config`]; only the secrets (database URI, model API keys) must come
//! from the environment. Secrets are resolved with [`secret`] when a
//! provider or store is constructed, before any connection is opened.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use shop_seeder_core::models::VectorIndex;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default = "default_uri_env")]
    pub uri_env: String,
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Abort when the vector index is missing instead of warning.
    #[serde(default)]
    pub require_index: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            uri_env: default_uri_env(),
            path: default_db_path(),
            database: default_database(),
            collection: default_collection(),
            require_index: false,
        }
    }
}

fn default_backend() -> String {
    "mongodb".to_string()
}
fn default_uri_env() -> String {
    "MONGODB_ATLAS_URI".to_string()
}
fn default_db_path() -> PathBuf {
    PathBuf::from("./data/shops.sqlite")
}
fn default_database() -> String {
    "grocery_database".to_string()
}
fn default_collection() -> String {
    "shops".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    #[serde(default = "default_index_name")]
    pub name: String,
    #[serde(default = "default_text_key")]
    pub text_key: String,
    #[serde(default = "default_embedding_key")]
    pub embedding_key: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            name: default_index_name(),
            text_key: default_text_key(),
            embedding_key: default_embedding_key(),
        }
    }
}

fn default_index_name() -> String {
    "vector_index".to_string()
}
fn default_text_key() -> String {
    "embedding_text".to_string()
}
fn default_embedding_key() -> String {
    "embedding".to_string()
}

impl IndexConfig {
    pub fn to_vector_index(&self) -> VectorIndex {
        VectorIndex {
            name: self.name.clone(),
            text_key: self.text_key.clone(),
            embedding_key: self.embedding_key.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_generation_provider")]
    pub provider: String,
    #[serde(default = "default_generation_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_min_products")]
    pub min_products: usize,
    /// Override the provider's API root (proxies, compatible gateways).
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub max_retries: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_generation_provider(),
            model: default_generation_model(),
            temperature: default_temperature(),
            min_products: default_min_products(),
            base_url: None,
            timeout_secs: default_generation_timeout(),
            max_retries: 0,
        }
    }
}

fn default_generation_provider() -> String {
    "gemini".to_string()
}
fn default_generation_model() -> String {
    "gemini-1.5-pro".to_string()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_min_products() -> usize {
    10
}
fn default_generation_timeout() -> u64 {
    120
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_dims")]
    pub dims: usize,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub max_retries: u32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            dims: default_dims(),
            base_url: None,
            timeout_secs: default_embedding_timeout(),
            max_retries: 0,
        }
    }
}

fn default_embedding_provider() -> String {
    "gemini".to_string()
}
fn default_embedding_model() -> String {
    "text-embedding-004".to_string()
}
fn default_dims() -> usize {
    768
}
fn default_embedding_timeout() -> u64 {
    30
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        let config = Config::default();
        validate(&config)?;
        return Ok(config);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    // Validate store
    match config.store.backend.as_str() {
        "mongodb" | "sqlite" => {}
        other => bail!(
            "Unknown store backend: '{}'. Must be mongodb or sqlite.",
            other
        ),
    }
    if config.store.database.trim().is_empty() {
        bail!("store.database must not be empty");
    }
    if config.store.collection.trim().is_empty() {
        bail!("store.collection must not be empty");
    }

    // Validate index
    if config.index.name.trim().is_empty() {
        bail!("index.name must not be empty");
    }
    if config.index.text_key.trim().is_empty() || config.index.embedding_key.trim().is_empty() {
        bail!("index.text_key and index.embedding_key must not be empty");
    }
    if config.index.text_key == config.index.embedding_key {
        bail!(
            "index.text_key and index.embedding_key must differ (both '{}')",
            config.index.text_key
        );
    }

    // Validate generation
    match config.generation.provider.as_str() {
        "gemini" | "openai" => {}
        other => bail!(
            "Unknown generation provider: '{}'. Must be gemini or openai.",
            other
        ),
    }
    if !(0.0..=2.0).contains(&config.generation.temperature) {
        bail!("generation.temperature must be in [0.0, 2.0]");
    }
    if config.generation.min_products == 0 {
        bail!("generation.min_products must be >= 1");
    }

    // Validate embedding
    match config.embedding.provider.as_str() {
        "gemini" | "openai" | "local" => {}
        other => bail!(
            "Unknown embedding provider: '{}'. Must be gemini, openai, or local.",
            other
        ),
    }
    if config.embedding.dims == 0 {
        bail!("embedding.dims must be > 0");
    }

    Ok(())
}

/// Read a required secret from the environment.
///
/// Missing and blank values are both errors.
pub fn secret(var: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => bail!("{} environment variable is not set", var),
    }
}
