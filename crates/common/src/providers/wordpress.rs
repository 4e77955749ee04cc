//! WordPress REST publishing client
//!
//! Creates posts via /wp-json/wp/v2/posts using an application
//! password (HTTP basic auth).

use crate::config::WordPressConfig;
use crate::errors::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Payload for a publish call
#[derive(Debug, Clone, Serialize)]
pub struct PublishPayload {
    pub title: String,
    pub slug: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    /// WordPress author ID mapped from the contributor persona
    pub author: i64,
    pub status: String,
}

/// The remote post record we care about
#[derive(Debug, Clone, Deserialize)]
pub struct PublishedPost {
    pub id: i64,
    #[serde(default)]
    pub link: Option<String>,
}

pub struct WordPressClient {
    client: reqwest::Client,
    base_url: String,
    username: String,
    app_password: String,
}

impl WordPressClient {
    /// Create a client from configuration; errors when publishing is not configured
    pub fn from_config(config: &WordPressConfig) -> Result<Self> {
        let base_url = config
            .base_url
            .clone()
            .ok_or_else(|| AppError::Configuration {
                message: "WordPress base_url required".to_string(),
            })?;
        let username = config
            .username
            .clone()
            .ok_or_else(|| AppError::Configuration {
                message: "WordPress username required".to_string(),
            })?;
        let app_password = config
            .app_password
            .clone()
            .ok_or_else(|| AppError::Configuration {
                message: "WordPress app_password required".to_string(),
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
            app_password,
        })
    }

    /// Create a published post
    pub async fn create_post(&self, payload: &PublishPayload) -> Result<PublishedPost> {
        let url = format!("{}/wp-json/wp/v2/posts", self.base_url);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.username, Some(&self.app_password))
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::PublishError {
                message: format!("Request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::PublishError {
                message: format!("WordPress error {}: {}", status, body),
            });
        }

        response.json().await.map_err(|e| AppError::PublishError {
            message: format!("Failed to parse response: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_requires_credentials() {
        let config = WordPressConfig {
            base_url: Some("https://example.com/".into()),
            username: None,
            app_password: None,
            timeout_secs: 30,
        };
        assert!(WordPressClient::from_config(&config).is_err());
    }

    #[test]
    fn test_payload_serialization_skips_empty_excerpt() {
        let payload = PublishPayload {
            title: "T".into(),
            slug: "t".into(),
            content: "<p>x</p>".into(),
            excerpt: None,
            author: 4,
            status: "publish".into(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("excerpt").is_none());
        assert_eq!(json["author"], 4);
    }
}
