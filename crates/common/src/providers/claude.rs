//! Claude client (Anthropic messages endpoint)
//!
//! Serves two roles: auto-fix generator for the quality loop, and
//! humanization fallback when StealthGPT is down.

use super::{backoff_delay, fix_prompt, DraftRequest, Humanizer, TextGenerator};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

const HUMANIZE_PROMPT: &str = "Rewrite the following HTML article so it reads \
like it was written by a human subject-matter expert: vary sentence length, \
remove formulaic transitions, keep every heading, link and factual claim \
intact. Return only the rewritten HTML.";

pub struct ClaudeClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    max_retries: u32,
}

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

impl ClaudeClient {
    /// Create a new Claude client
    pub fn new(
        api_key: String,
        model: Option<String>,
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
            api_key,
            model: model.unwrap_or_else(|| crate::DEFAULT_FALLBACK_MODEL.to_string()),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            max_retries,
        }
    }

    async fn message_with_retry(
        &self,
        system: &str,
        prompt: String,
        max_tokens: u32,
    ) -> Result<String> {
        let mut last_error = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                tokio::time::sleep(backoff_delay(attempt)).await;
            }

            match self.message(system, &prompt, max_tokens).await {
                Ok(content) => return Ok(content),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        error = %e,
                        "Claude request failed, retrying"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| AppError::Provider {
            provider: "claude".to_string(),
            message: "Unknown error after retries".to_string(),
        }))
    }

    async fn message(&self, system: &str, prompt: &str, max_tokens: u32) -> Result<String> {
        let url = format!("{}/v1/messages", self.base_url);

        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens,
            system: system.to_string(),
            messages: vec![Message {
                role: "user",
                content: prompt.to_string(),
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Provider {
                provider: "claude".to_string(),
                message: format!("Request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Provider {
                provider: "claude".to_string(),
                message: format!("API error {}: {}", status, body),
            });
        }

        let result: MessagesResponse =
            response.json().await.map_err(|e| AppError::Provider {
                provider: "claude".to_string(),
                message: format!("Failed to parse response: {}", e),
            })?;

        let text: String = result
            .content
            .into_iter()
            .map(|block| block.text)
            .collect();

        if text.is_empty() {
            return Err(AppError::Provider {
                provider: "claude".to_string(),
                message: "Empty response".to_string(),
            });
        }

        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for ClaudeClient {
    async fn draft(&self, request: &DraftRequest) -> Result<String> {
        self.message_with_retry(
            "You are an experienced education writer producing complete, \
             well-structured HTML articles.",
            request.prompt(),
            request.max_tokens,
        )
        .await
    }

    async fn fix(&self, html: &str, issues: &[String]) -> Result<String> {
        self.message_with_retry(
            "You are a careful editor fixing specific flagged problems.",
            fix_prompt(html, issues),
            8192,
        )
        .await
    }

    fn name(&self) -> &str {
        "claude"
    }
}

#[async_trait]
impl Humanizer for ClaudeClient {
    async fn humanize(&self, html: &str) -> Result<String> {
        self.message_with_retry(HUMANIZE_PROMPT, html.to_string(), 8192)
            .await
    }

    fn name(&self) -> &str {
        "claude"
    }
}
