//! DataForSEO client (keyword research endpoints)
//!
//! Used by idea discovery: seed keywords in, keyword suggestions with
//! monthly search volume out. HTTP basic auth (login:password).

use super::backoff_delay;
use crate::errors::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.dataforseo.com";

/// A keyword suggestion returned by the vendor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordSuggestion {
    pub keyword: String,
    pub search_volume: Option<i64>,
}

pub struct DataForSeoClient {
    client: reqwest::Client,
    login: String,
    password: String,
    base_url: String,
    max_retries: u32,
}

#[derive(Serialize)]
struct KeywordsTask {
    keywords: Vec<String>,
    language_code: &'static str,
    location_code: u32,
}

#[derive(Deserialize)]
struct TasksResponse {
    tasks: Option<Vec<Task>>,
}

#[derive(Deserialize)]
struct Task {
    result: Option<Vec<TaskResult>>,
}

#[derive(Deserialize)]
struct TaskResult {
    keyword: Option<String>,
    search_volume: Option<i64>,
}

impl DataForSeoClient {
    /// Create a new client. `credentials` is "login:password".
    pub fn new(
        credentials: &str,
        base_url: Option<String>,
        timeout_secs: u64,
        max_retries: u32,
    ) -> Result<Self> {
        let (login, password) =
            credentials
                .split_once(':')
                .ok_or_else(|| AppError::Configuration {
                    message: "DataForSEO credentials must be login:password".to_string(),
                })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self {
            client,
            login: login.to_string(),
            password: password.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            max_retries,
        })
    }

    /// Fetch keyword suggestions for the given seed keywords
    pub async fn keyword_suggestions(&self, seeds: &[String]) -> Result<Vec<KeywordSuggestion>> {
        let mut last_error = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                tokio::time::sleep(backoff_delay(attempt)).await;
            }

            match self.fetch_suggestions(seeds).await {
                Ok(suggestions) => return Ok(suggestions),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        error = %e,
                        "DataForSEO request failed, retrying"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| AppError::KeywordError {
            message: "Unknown error after retries".to_string(),
        }))
    }

    async fn fetch_suggestions(&self, seeds: &[String]) -> Result<Vec<KeywordSuggestion>> {
        let url = format!(
            "{}/v3/keywords_data/google_ads/keywords_for_keywords/live",
            self.base_url
        );

        // US English; the site only targets that market
        let body = vec![KeywordsTask {
            keywords: seeds.to_vec(),
            language_code: "en",
            location_code: 2840,
        }];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.login, Some(&self.password))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::KeywordError {
                message: format!("Request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::KeywordError {
                message: format!("API error {}: {}", status, body),
            });
        }

        let result: TasksResponse = response.json().await.map_err(|e| AppError::KeywordError {
            message: format!("Failed to parse response: {}", e),
        })?;

        let suggestions = result
            .tasks
            .unwrap_or_default()
            .into_iter()
            .flat_map(|task| task.result.unwrap_or_default())
            .filter_map(|r| {
                r.keyword.map(|keyword| KeywordSuggestion {
                    keyword,
                    search_volume: r.search_volume,
                })
            })
            .collect();

        Ok(suggestions)
    }
}
