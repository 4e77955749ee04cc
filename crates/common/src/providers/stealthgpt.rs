//! StealthGPT client (humanize endpoint)
//!
//! Primary humanization provider. Token auth via api-token header.

use super::{backoff_delay, Humanizer};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://stealthgpt.ai/api";

pub struct StealthGptClient {
    client: reqwest::Client,
    api_token: String,
    base_url: String,
    max_retries: u32,
}

#[derive(Serialize)]
struct StealthifyRequest {
    prompt: String,
    rephrase: bool,
    tone: &'static str,
    mode: &'static str,
}

#[derive(Deserialize)]
struct StealthifyResponse {
    result: String,
}

impl StealthGptClient {
    /// Create a new StealthGPT client
    pub fn new(
        api_token: String,
        base_url: Option<String>,
        timeout_secs: u64,
        max_retries: u32,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_token,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            max_retries,
        }
    }

    async fn stealthify_with_retry(&self, html: &str) -> Result<String> {
        let mut last_error = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                tokio::time::sleep(backoff_delay(attempt)).await;
            }

            match self.stealthify(html).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        error = %e,
                        "StealthGPT request failed, retrying"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| AppError::Provider {
            provider: "stealthgpt".to_string(),
            message: "Unknown error after retries".to_string(),
        }))
    }

    async fn stealthify(&self, html: &str) -> Result<String> {
        let url = format!("{}/stealthify", self.base_url);

        let request = StealthifyRequest {
            prompt: html.to_string(),
            rephrase: true,
            tone: "College",
            mode: "High",
        };

        let response = self
            .client
            .post(&url)
            .header("api-token", &self.api_token)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Provider {
                provider: "stealthgpt".to_string(),
                message: format!("Request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Provider {
                provider: "stealthgpt".to_string(),
                message: format!("API error {}: {}", status, body),
            });
        }

        let result: StealthifyResponse =
            response.json().await.map_err(|e| AppError::Provider {
                provider: "stealthgpt".to_string(),
                message: format!("Failed to parse response: {}", e),
            })?;

        if result.result.trim().is_empty() {
            return Err(AppError::Provider {
                provider: "stealthgpt".to_string(),
                message: "Empty result".to_string(),
            });
        }

        Ok(result.result)
    }
}

#[async_trait]
impl Humanizer for StealthGptClient {
    async fn humanize(&self, html: &str) -> Result<String> {
        self.stealthify_with_retry(html).await
    }

    fn name(&self) -> &str {
        "stealthgpt"
    }
}
