use anyhow::{Context, Result, anyhow};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Retry settings shared by the HTTP providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub retries: usize,
    pub delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            delay_ms: 500,
        }
    }
}

pub fn new_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("realgain/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

/// GETs `url` and decodes the JSON body.
///
/// Transport errors and 5xx responses are retried according to `policy`;
/// any other non-success status fails immediately.
pub async fn get_json_with_retry<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    policy: RetryPolicy,
) -> Result<T> {
    let mut attempt = 1;
    loop {
        let err = match client.get(url).send().await {
            Ok(response) if response.status().is_server_error() => {
                anyhow!("HTTP error: {} for {}", response.status(), url)
            }
            Ok(response) if !response.status().is_success() => {
                return Err(anyhow!("HTTP error: {} for {}", response.status(), url));
            }
            Ok(response) => {
                let text = response
                    .text()
                    .await
                    .with_context(|| format!("Failed to read response body from {url}"))?;
                return serde_json::from_str(&text)
                    .with_context(|| format!("Failed to parse JSON response from {url}"));
            }
            Err(e) => anyhow!("Request error: {} for {}", e, url),
        };

        if attempt > policy.retries {
            return Err(err);
        }
        debug!(
            "Attempt {}/{} failed: {}. Retrying...",
            attempt, policy.retries, err
        );
        attempt += 1;
        tokio::time::sleep(Duration::from_millis(policy.delay_ms)).await;
    }
}
