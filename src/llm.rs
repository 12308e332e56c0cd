//! Text-generation providers.
//!
//! Implements [`ChatModel`] for:
//! - **[`GeminiChat`]**: Google Generative Language API `generateContent`.
//!   Requires `GOOGLE_API_KEY`.
//! - **[`OpenAiChat`]**: OpenAI `POST /v1/chat/completions`.
//!   Requires `OPENAI_API_KEY`.
//!
//! Both send the prompt as a single user turn and return the concatenated
//! text of the first candidate. Use [`create_chat_model`] to pick one from
//! configuration.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use shop_seeder_core::generation::ChatModel;

use crate::config::{self, GenerationConfig};
use crate::http;

pub(crate) const GEMINI_API: &str = "https://generativelanguage.googleapis.com/v1beta";
pub(crate) const OPENAI_API: &str = "https://api.openai.com/v1";

// ============ Gemini ============

/// Chat model backed by the Gemini API.
pub struct GeminiChat {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_retries: u32,
}

impl GeminiChat {
    pub fn new(config: &GenerationConfig, api_key: String) -> Result<Self> {
        let base = config.base_url.as_deref().unwrap_or(GEMINI_API);
        Ok(Self {
            client: http::client(config.timeout_secs)?,
            endpoint: format!(
                "{}/models/{}:generateContent",
                base.trim_end_matches('/'),
                config.model
            ),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl ChatModel for GeminiChat {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn invoke(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": self.temperature },
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

/// Extract the first candidate's text from a `generateContent` response.
fn parse_gemini_response(json: &Value) -> Result<String> {
    let candidate = match json
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
    {
        Some(candidate) => candidate,
        None => {
            if let Some(reason) = json
                .pointer("/promptFeedback/blockReason")
                .and_then(|r| r.as_str())
            {
                bail!("Gemini blocked the prompt: {}", reason);
            }
            bail!("Invalid Gemini response: missing candidates");
        }
    };

    let parts = candidate
        .pointer("/content/parts")
        .and_then(|p| p.as_array())
        .ok_or_else(|| {
            let reason = candidate
                .get("finishReason")
                .and_then(|r| r.as_str())
                .unwrap_or("unknown");
            anyhow!("Gemini returned no content (finishReason: {})", reason)
        })?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.trim().is_empty() {
        bail!("Gemini returned an empty response");
    }
    Ok(text)
}

// ============ OpenAI ============

/// Chat model backed by OpenAI chat completions.
pub struct OpenAiChat {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_retries: u32,
}

impl OpenAiChat {
    pub fn new(config: &GenerationConfig, api_key: String) -> Result<Self> {
        let base = config.base_url.as_deref().unwrap_or(OPENAI_API);
        Ok(Self {
            client: http::client(config.timeout_secs)?,
            endpoint: format!("{}/chat/completions", base.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn invoke(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [{ "role": "user", "content": prompt }],
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

fn parse_openai_response(json: &Value) -> Result<String> {
    let content = json
        .pointer("/choices/0/message/content")
        .and_then(|c| c.as_str())
        .ok_or_else(|| anyhow!("Invalid OpenAI response: missing choices[0].message.content"))?;

    if content.trim().is_empty() {
        bail!("OpenAI returned an empty response");
    }
    Ok(content.to_string())
}

/// Create the configured [`ChatModel`].
///
/// | Config Value | Provider | Secret |
/// |-------------|----------|--------|
/// | `"gemini"` | [`GeminiChat`] | `GOOGLE_API_KEY` |
/// | `"openai"` | [`OpenAiChat`] | `OPENAI_API_KEY` |
///
/// # Errors
///
/// Unknown provider names and missing API keys.
pub fn create_chat_model(config: &GenerationConfig) -> Result<Box<dyn ChatModel>> {
    match config.provider.as_str() {
        "gemini" => Ok(Box::new(GeminiChat::new(
            config,
            config::secret("GOOGLE_API_KEY")?,
        )?)),
        "openai" => Ok(Box::new(OpenAiChat::new(
            config,
            config::secret("OPENAI_API_KEY")?,
        )?)),
        other => bail!("Unknown generation provider: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gemini_joins_parts() {
        let json = json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "```json\n{" }, { "text": "}\n```" }] },
                "finishReason": "STOP"
            }]
        });
        assert_eq!(parse_gemini_response(&json).unwrap(), "```json\n{}\n```");
    }

    #[test]
    fn test_parse_gemini_blocked() {
        let json = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let err = parse_gemini_response(&json).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_parse_gemini_no_content() {
        let json = json!({ "candidates": [{ "finishReason": "MAX_TOKENS" }] });
        let err = parse_gemini_response(&json).unwrap_err();
        assert!(err.to_string().contains("MAX_TOKENS"));
    }

    #[test]
    fn test_parse_openai_content() {
        let json = json!({
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": "{\"name\":\"x\"}" } }]
        });
        assert_eq!(parse_openai_response(&json).unwrap(), "{\"name\":\"x\"}");
    }

    #[test]
    fn test_parse_openai_missing_choices() {
        assert!(parse_openai_response(&json!({ "choices": [] })).is_err());
    }

    #[test]
    fn test_gemini_endpoint_uses_model_and_base() {
        let config = GenerationConfig {
            base_url: Some("http://localhost:8080/v1beta/".to_string()),
            ..GenerationConfig::default()
        };
        let chat = GeminiChat::new(&config, "key".to_string()).unwrap();
        assert_eq!(
            chat.endpoint,
            "http://localhost:8080/v1beta/models/gemini-1.5-pro:generateContent"
        );
        assert_eq!(chat.model_name(), "gemini-1.5-pro");
    }
}
