//! Embedding providers.
//!
//! Implements [`Embedder`] for:
//! - **[`GeminiEmbedder`]**: Google Generative Language API `embedContent`.
//!   Requires `GOOGLE_API_KEY`.
//! - **[`OpenAiEmbedder`]**: OpenAI `POST /v1/embeddings`. Requires
//!   `OPENAI_API_KEY`.
//! - **`LocalEmbedder`**: runs models locally via fastembed (feature
//!   `local-embeddings`); no network calls after the model download.
//!
//! # Provider Selection
//!
//! Use [`create_embedder`] to instantiate the provider named by
//! `[embedding] provider` in the configuration.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use shop_seeder_core::embedding::Embedder;

use crate::config::{self, EmbeddingConfig};
use crate::http;
use crate::llm::{GEMINI_API, OPENAI_API};

// ============ Gemini ============

/// Embedding provider using the Gemini `embedContent` endpoint.
pub struct GeminiEmbedder {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    dims: usize,
    max_retries: u32,
}

impl GeminiEmbedder {
    pub fn new(config: &EmbeddingConfig, api_key: String) -> Result<Self> {
        let base = config.base_url.as_deref().unwrap_or(GEMINI_API);
        Ok(Self {
            client: http::client(config.timeout_secs)?,
            endpoint: format!(
                "{}/models/{}:embedContent",
                base.trim_end_matches('/'),
                config.model
            ),
            api_key,
            model: config.model.clone(),
            dims: config.dims,
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let body = json!({
            "model": format!("models/{}", self.model),
            "content": { "parts": [{ "text": text }] },
            "outputDimensionality": self.dims,
        });

        let json = http::send_json(
            || {
                self.client
                    .post(&self.endpoint)
                    .header("x-goog-api-key", &self.api_key)
                    .json(&body)
            },
            self.max_retries,
            "Gemini",
        )
        .await?;

        parse_gemini_response(&json)
    }
}

/// Parse an `embedContent` response: `{"embedding": {"values": [...]}}`.
fn parse_gemini_response(json: &Value) -> Result<Vec<f32>> {
    let values = json
        .pointer("/embedding/values")
        .ok_or_else(|| anyhow!("Invalid Gemini response: missing embedding.values"))?;
    to_vector(values)
}

// ============ OpenAI ============

/// Embedding provider using the OpenAI API.
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    dims: usize,
    max_retries: u32,
}

impl OpenAiEmbedder {
    pub fn new(config: &EmbeddingConfig, api_key: String) -> Result<Self> {
        let base = config.base_url.as_deref().unwrap_or(OPENAI_API);
        Ok(Self {
            client: http::client(config.timeout_secs)?,
            endpoint: format!("{}/embeddings", base.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            dims: config.dims,
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let body = json!({
            "model": self.model,
            "input": [text],
        });

        let json = http::send_json(
            || {
                self.client
                    .post(&self.endpoint)
                    .bearer_auth(&self.api_key)
                    .json(&body)
            },
            self.max_retries,
            "OpenAI",
        )
        .await?;

        parse_openai_response(&json)
    }
}

/// Parse an OpenAI embeddings response, taking `data[0].embedding`.
fn parse_openai_response(json: &Value) -> Result<Vec<f32>> {
    let embedding = json
        .pointer("/data/0/embedding")
        .ok_or_else(|| anyhow!("Invalid OpenAI response: missing data[0].embedding"))?;
    to_vector(embedding)
}

fn to_vector(values: &Value) -> Result<Vec<f32>> {
    let array = values
        .as_array()
        .ok_or_else(|| anyhow!("embedding is not an array"))?;
    array
        .iter()
        .map(|v| {
            v.as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| anyhow!("embedding contains a non-numeric value: {}", v))
        })
        .collect()
}

// ============ Local Provider (fastembed) ============

/// Embedding provider for local inference via fastembed.
///
/// Models are downloaded from Hugging Face on first use and cached.
#[cfg(feature = "local-embeddings")]
pub struct LocalEmbedder {
    model: String,
    dims: usize,
}

#[cfg(feature = "local-embeddings")]
impl LocalEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        // Fail on unknown names before the pipeline starts.
        config_to_fastembed_model(&config.model)?;
        Ok(Self {
            model: config.model.clone(),
            dims: config.dims,
        })
    }
}

#[cfg(feature = "local-embeddings")]
#[async_trait]
impl Embedder for LocalEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let fastembed_model = config_to_fastembed_model(&self.model)?;
        let texts = vec![text.to_string()];

        let embeddings = tokio::task::spawn_blocking(move || -> Result<Vec<Vec<f32>>> {
            let mut model = fastembed::TextEmbedding::try_new(
                fastembed::InitOptions::new(fastembed_model).with_show_download_progress(true),
            )
            .map_err(|e| anyhow!("Failed to initialize local embedding model: {}", e))?;

            model
                .embed(texts, None)
                .map_err(|e| anyhow!("Local embedding failed: {}", e))
        })
        .await??;

        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Empty embedding response"))
    }
}

#[cfg(feature = "local-embeddings")]
fn config_to_fastembed_model(name: &str) -> Result<fastembed::EmbeddingModel> {
    match name {
        "all-minilm-l6-v2" => Ok(fastembed::EmbeddingModel::AllMiniLML6V2),
        "bge-small-en-v1.5" => Ok(fastembed::EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" => Ok(fastembed::EmbeddingModel::BGEBaseENV15),
        "bge-large-en-v1.5" => Ok(fastembed::EmbeddingModel::BGELargeENV15),
        "nomic-embed-text-v1.5" => Ok(fastembed::EmbeddingModel::NomicEmbedTextV15),
        other => bail!(
            "Unknown local embedding model: '{}'. Supported models: \
             all-minilm-l6-v2, bge-small-en-v1.5, bge-base-en-v1.5, bge-large-en-v1.5, \
             nomic-embed-text-v1.5",
            other
        ),
    }
}

/// Create the configured [`Embedder`].
///
/// | Config Value | Provider | Secret |
/// |-------------|----------|--------|
/// | `"gemini"` | [`GeminiEmbedder`] | `GOOGLE_API_KEY` |
/// | `"openai"` | [`OpenAiEmbedder`] | `OPENAI_API_KEY` |
/// | `"local"` | `LocalEmbedder` (feature `local-embeddings`) | none |
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Box<dyn Embedder>> {
    match config.provider.as_str() {
        "gemini" => Ok(Box::new(GeminiEmbedder::new(
            config,
            config::secret("GOOGLE_API_KEY")?,
        )?)),
        "openai" => Ok(Box::new(OpenAiEmbedder::new(
            config,
            config::secret("OPENAI_API_KEY")?,
        )?)),
        #[cfg(feature = "local-embeddings")]
        "local" => Ok(Box::new(LocalEmbedder::new(config)?)),
        #[cfg(not(feature = "local-embeddings"))]
        "local" => bail!("Local embedding provider requires --features local-embeddings"),
        other => bail!("Unknown embedding provider: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gemini_values() {
        let json = json!({ "embedding": { "values": [0.5, -0.25, 1] } });
        assert_eq!(parse_gemini_response(&json).unwrap(), vec![0.5, -0.25, 1.0]);
    }

    #[test]
    fn test_parse_gemini_missing_values() {
        assert!(parse_gemini_response(&json!({ "embedding": {} })).is_err());
    }

    #[test]
    fn test_parse_openai_first_embedding() {
        let json = json!({
            "object": "list",
            "data": [{ "object": "embedding", "index": 0, "embedding": [0.125, 0.75] }],
            "model": "text-embedding-3-small"
        });
        assert_eq!(parse_openai_response(&json).unwrap(), vec![0.125, 0.75]);
    }

    #[test]
    fn test_non_numeric_value_rejected() {
        let json = json!({ "embedding": { "values": [0.5, "x"] } });
        let err = parse_gemini_response(&json).unwrap_err();
        assert!(err.to_string().contains("non-numeric"));
    }

    #[test]
    fn test_openai_endpoint() {
        let config = EmbeddingConfig {
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            dims: 1536,
            ..EmbeddingConfig::default()
        };
        let embedder = OpenAiEmbedder::new(&config, "key".to_string()).unwrap();
        assert_eq!(embedder.endpoint, "https://api.openai.com/v1/embeddings");
        assert_eq!(embedder.dims(), 1536);
    }

    #[cfg(not(feature = "local-embeddings"))]
    #[test]
    fn test_local_requires_feature() {
        let config = EmbeddingConfig {
            provider: "local".to_string(),
            ..EmbeddingConfig::default()
        };
        let err = create_embedder(&config).err().unwrap();
        assert!(err.to_string().contains("local-embeddings"));
    }
}
