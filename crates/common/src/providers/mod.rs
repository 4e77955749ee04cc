//! AI provider abstraction
//!
//! Provides unified interfaces over the remote vendors the pipeline calls:
//! - Text generation (Grok chat completions, Claude messages)
//! - Humanization (StealthGPT, with Claude as rewrite fallback)
//! - Keyword discovery (DataForSEO)
//! - Publishing (WordPress REST)
//!
//! Fallback ordering is declarative: `HumanizerChain` holds providers in
//! the order they should be tried, rather than nested error handling at
//! the call sites.

mod claude;
mod dataforseo;
mod grok;
mod stealthgpt;
mod wordpress;

pub use claude::ClaudeClient;
pub use dataforseo::{DataForSeoClient, KeywordSuggestion};
pub use grok::GrokClient;
pub use stealthgpt::StealthGptClient;
pub use wordpress::{PublishPayload, PublishedPost, WordPressClient};

use crate::config::ProvidersConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Inputs for a draft generation call
#[derive(Debug, Clone)]
pub struct DraftRequest {
    pub title: String,
    pub topics: Vec<String>,
    pub content_type: String,
    /// Short voice description of the assigned contributor persona
    pub contributor_voice: String,
    pub target_word_count: usize,
    /// Token budget; raised by the orchestrator on the regeneration retry
    pub max_tokens: u32,
}

impl DraftRequest {
    /// The user prompt shared by all chat-style generators
    pub fn prompt(&self) -> String {
        format!(
            "Write a complete educational article titled \"{}\".\n\
             Content type: {}. Topics to cover: {}.\n\
             Write in the voice of {}.\n\
             Requirements: roughly {} words of HTML body (no <html> or <body> wrapper), \
             at least 3 <h2> section headings, a FAQ section with at least 3 \
             question-and-answer pairs, and at least 2 links to reputable external \
             sources. End with a complete closing paragraph.",
            self.title,
            self.content_type,
            self.topics.join(", "),
            self.contributor_voice,
            self.target_word_count,
        )
    }
}

/// Build the instruction prompt for an auto-fix call
pub(crate) fn fix_prompt(html: &str, issues: &[String]) -> String {
    format!(
        "The following HTML article has quality problems:\n- {}\n\n\
         Rewrite the article fixing every listed problem. Keep the topic, voice, \
         structure and all existing links. Return only the corrected HTML body.\n\n{}",
        issues.join("\n- "),
        html,
    )
}

/// Trait for chat-style text generation
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a full article draft
    async fn draft(&self, request: &DraftRequest) -> Result<String>;

    /// Rewrite content to address specific flagged issues
    async fn fix(&self, html: &str, issues: &[String]) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Trait for AI-detectability post-processing
#[async_trait]
pub trait Humanizer: Send + Sync {
    /// Rewrite the HTML to read less like detector-flagged AI output
    async fn humanize(&self, html: &str) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Ordered humanizer providers, tried first to last.
///
/// A provider failure is logged and the next provider is tried; the chain
/// errors only when every provider has failed.
pub struct HumanizerChain {
    providers: Vec<Arc<dyn Humanizer>>,
}

impl HumanizerChain {
    pub fn new(providers: Vec<Arc<dyn Humanizer>>) -> Self {
        Self { providers }
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Try each provider in order, returning the first success
    pub async fn humanize(&self, html: &str) -> Result<String> {
        let mut last_error = None;

        for provider in &self.providers {
            match provider.humanize(html).await {
                Ok(result) => {
                    tracing::debug!(provider = provider.name(), "Humanization succeeded");
                    return Ok(result);
                }
                Err(e) => {
                    tracing::warn!(
                        provider = provider.name(),
                        error = %e,
                        "Humanizer failed, trying next provider"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(AppError::HumanizeFailed {
            message: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no humanizer providers configured".to_string()),
        })
    }
}

/// Shared retry schedule for provider calls: exponential backoff
/// starting at 100ms, doubling per attempt.
pub(crate) fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(100 * 2_u64.pow(attempt))
}

/// Create the draft generator from configuration (Grok)
pub fn create_generator(config: &ProvidersConfig) -> Result<Arc<dyn TextGenerator>> {
    let api_key = config
        .grok
        .api_key
        .clone()
        .ok_or_else(|| AppError::Configuration {
            message: "Grok API key required".to_string(),
        })?;

    Ok(Arc::new(GrokClient::new(
        api_key,
        config.grok.model.clone(),
        config.grok.api_base.clone(),
        config.grok.timeout_secs,
        config.grok.max_retries,
    )))
}

/// Create the auto-fix generator from configuration (Claude)
pub fn create_fixer(config: &ProvidersConfig) -> Result<Arc<dyn TextGenerator>> {
    let api_key = config
        .claude
        .api_key
        .clone()
        .ok_or_else(|| AppError::Configuration {
            message: "Claude API key required".to_string(),
        })?;

    Ok(Arc::new(ClaudeClient::new(
        api_key,
        config.claude.model.clone(),
        config.claude.api_base.clone(),
        config.claude.timeout_secs,
        config.claude.max_retries,
    )))
}

/// Create the humanizer fallback chain from configuration:
/// StealthGPT first, Claude rewrite as fallback.
pub fn create_humanizer_chain(config: &ProvidersConfig) -> Result<HumanizerChain> {
    let mut providers: Vec<Arc<dyn Humanizer>> = Vec::new();

    if let Some(ref key) = config.stealthgpt.api_key {
        providers.push(Arc::new(StealthGptClient::new(
            key.clone(),
            config.stealthgpt.api_base.clone(),
            config.stealthgpt.timeout_secs,
            config.stealthgpt.max_retries,
        )));
    }

    if let Some(ref key) = config.claude.api_key {
        providers.push(Arc::new(ClaudeClient::new(
            key.clone(),
            config.claude.model.clone(),
            config.claude.api_base.clone(),
            config.claude.timeout_secs,
            config.claude.max_retries,
        )));
    }

    if providers.is_empty() {
        return Err(AppError::Configuration {
            message: "At least one humanizer provider must be configured".to_string(),
        });
    }

    Ok(HumanizerChain::new(providers))
}

/// Mock generator for testing
pub struct MockGenerator {
    /// Returned by `draft`
    pub draft_response: String,
    /// Returned by `fix`; None echoes the input back unchanged
    pub fix_response: Option<String>,
    /// When true every call errors
    pub failing: bool,
}

impl MockGenerator {
    pub fn returning(draft_response: impl Into<String>) -> Self {
        Self {
            draft_response: draft_response.into(),
            fix_response: None,
            failing: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            draft_response: String::new(),
            fix_response: None,
            failing: true,
        }
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn draft(&self, _request: &DraftRequest) -> Result<String> {
        if self.failing {
            return Err(AppError::Provider {
                provider: "mock".into(),
                message: "simulated failure".into(),
            });
        }
        Ok(self.draft_response.clone())
    }

    async fn fix(&self, html: &str, _issues: &[String]) -> Result<String> {
        if self.failing {
            return Err(AppError::Provider {
                provider: "mock".into(),
                message: "simulated failure".into(),
            });
        }
        Ok(self
            .fix_response
            .clone()
            .unwrap_or_else(|| html.to_string()))
    }

    fn name(&self) -> &str {
        "mock-generator"
    }
}

/// Mock humanizer for testing
pub struct MockHumanizer {
    pub failing: bool,
    pub marker: String,
}

impl MockHumanizer {
    pub fn passthrough() -> Self {
        Self {
            failing: false,
            marker: String::new(),
        }
    }

    pub fn marking(marker: impl Into<String>) -> Self {
        Self {
            failing: false,
            marker: marker.into(),
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            marker: String::new(),
        }
    }
}

#[async_trait]
impl Humanizer for MockHumanizer {
    async fn humanize(&self, html: &str) -> Result<String> {
        if self.failing {
            return Err(AppError::Provider {
                provider: "mock".into(),
                message: "simulated failure".into(),
            });
        }
        Ok(format!("{}{}", html, self.marker))
    }

    fn name(&self) -> &str {
        "mock-humanizer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_chain_falls_through_to_fallback() {
        let chain = HumanizerChain::new(vec![
            Arc::new(MockHumanizer::failing()),
            Arc::new(MockHumanizer::marking("-fallback")),
        ]);

        let out = chain.humanize("<p>text</p>").await.unwrap();
        assert_eq!(out, "<p>text</p>-fallback");
    }

    #[tokio::test]
    async fn test_chain_errors_when_all_fail() {
        let chain = HumanizerChain::new(vec![
            Arc::new(MockHumanizer::failing()),
            Arc::new(MockHumanizer::failing()),
        ]);

        let err = chain.humanize("<p>text</p>").await.unwrap_err();
        assert!(matches!(err, AppError::HumanizeFailed { .. }));
    }

    #[tokio::test]
    async fn test_chain_prefers_primary() {
        let chain = HumanizerChain::new(vec![
            Arc::new(MockHumanizer::marking("-primary")),
            Arc::new(MockHumanizer::marking("-fallback")),
        ]);

        let out = chain.humanize("x").await.unwrap();
        assert_eq!(out, "x-primary");
    }

    #[test]
    fn test_draft_prompt_carries_requirements() {
        let request = DraftRequest {
            title: "Is a CS Degree Worth It".into(),
            topics: vec!["computer science".into(), "careers".into()],
            content_type: "career-guide".into(),
            contributor_voice: "a veteran software engineer".into(),
            target_word_count: 2000,
            max_tokens: 4096,
        };
        let prompt = request.prompt();
        assert!(prompt.contains("Is a CS Degree Worth It"));
        assert!(prompt.contains("2000 words"));
        assert!(prompt.contains("FAQ"));
    }
}
