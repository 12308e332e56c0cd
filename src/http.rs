//! JSON-over-HTTP plumbing shared by the model providers.
//!
//! Retry strategy (only when `max_retries > 0`; the default is a single
//! attempt):
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use anyhow::{anyhow, bail, Context, Result};
use reqwest::{RequestBuilder, StatusCode};
use std::time::Duration;

/// Build a client with the configured request timeout.
pub(crate) fn client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("failed to build HTTP client")
}

/// Send the request produced by `request` and decode a JSON body.
///
/// `request` is called once per attempt. `service` names the remote API
/// in error messages.
pub(crate) async fn send_json<F>(
    request: F,
    max_retries: u32,
    service: &str,
) -> Result<serde_json::Value>
where
    F: Fn() -> RequestBuilder,
{
    let mut last_err = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let delay = Duration::from_secs(1 << (attempt - 1).min(5));
            tracing::warn!(service, attempt, delay_secs = delay.as_secs(), "retrying request");
            tokio::time::sleep(delay).await;
        }

        match request().send().await {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    return response
                        .json()
                        .await
                        .with_context(|| format!("failed to decode {} response", service));
                }

                let body_text = response.text().await.unwrap_or_default();
                if should_retry(status) {
                    last_err = Some(anyhow!("{} API error {}: {}", service, status, body_text));
                    continue;
                }
                bail!("{} API error {}: {}", service, status, body_text);
            }
            Err(e) => {
                last_err = Some(anyhow!(e).context(format!("{} request failed", service)));
                continue;
            }
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow!("{} request failed after retries", service)))
}

fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        assert!(should_retry(StatusCode::TOO_MANY_REQUESTS));
        assert!(should_retry(StatusCode::BAD_GATEWAY));
        assert!(should_retry(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!should_retry(StatusCode::BAD_REQUEST));
        assert!(!should_retry(StatusCode::UNAUTHORIZED));
        assert!(!should_retry(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_network_error_single_attempt() {
        let client = client(1).unwrap();
        // Port 9 (discard) on localhost is closed in test environments.
        let err = send_json(|| client.post("http://127.0.0.1:9/none"), 0, "Test")
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("Test request failed"));
    }
}
