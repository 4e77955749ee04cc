//! Grok client (xAI chat completions endpoint)
//!
//! Primary draft generator. OpenAI-compatible request shape,
//! bearer token auth.

use super::{backoff_delay, fix_prompt, DraftRequest, TextGenerator};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.x.ai/v1";

const SYSTEM_PROMPT: &str = "You are an experienced education writer producing \
complete, well-structured HTML articles. Never truncate output and never leave \
placeholder text.";

pub struct GrokClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    max_retries: u32,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl GrokClient {
    /// Create a new Grok client
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
            model: model.unwrap_or_else(|| crate::DEFAULT_DRAFT_MODEL.to_string()),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            max_retries,
        }
    }

    /// Make a chat completion request with retry
    async fn complete_with_retry(&self, prompt: String, max_tokens: u32) -> Result<String> {
        let mut last_error = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                tokio::time::sleep(backoff_delay(attempt)).await;
            }

            match self.complete(&prompt, max_tokens).await {
                Ok(content) => return Ok(content),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        error = %e,
                        "Grok request failed, retrying"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| AppError::Provider {
            provider: "grok".to_string(),
            message: "Unknown error after retries".to_string(),
        }))
    }

    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.to_string(),
                },
            ],
            max_tokens,
            temperature: 0.7,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Provider {
                provider: "grok".to_string(),
                message: format!("Request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Provider {
                provider: "grok".to_string(),
                message: format!("API error {}: {}", status, body),
            });
        }

        let result: ChatResponse = response.json().await.map_err(|e| AppError::Provider {
            provider: "grok".to_string(),
            message: format!("Failed to parse response: {}", e),
        })?;

        result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::Provider {
                provider: "grok".to_string(),
                message: "Empty response".to_string(),
            })
    }
}

#[async_trait]
impl TextGenerator for GrokClient {
    async fn draft(&self, request: &DraftRequest) -> Result<String> {
        self.complete_with_retry(request.prompt(), request.max_tokens)
            .await
    }

    async fn fix(&self, html: &str, issues: &[String]) -> Result<String> {
        self.complete_with_retry(fix_prompt(html, issues), 8192).await
    }

    fn name(&self) -> &str {
        "grok"
    }
}
