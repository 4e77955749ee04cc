//! Perdia Common Library
//!
//! Shared code for the Perdia content engine services including:
//! - Database models and repository patterns
//! - AI provider client abstractions (drafting, humanization, keywords)
//! - Content heuristics (validation, quality scoring, slugs, linking)
//! - Monetization taxonomy matching
//! - Contributor persona assignment
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod auth;
pub mod config;
pub mod content;
pub mod contributors;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod monetize;
pub mod providers;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::Repository;
pub use errors::{AppError, Result};
pub use providers::{Humanizer, TextGenerator};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default draft model served by the Grok API
pub const DEFAULT_DRAFT_MODEL: &str = "grok-2-latest";

/// Default fallback model served by the Anthropic API
pub const DEFAULT_FALLBACK_MODEL: &str = "claude-sonnet-4-20250514";

/// Default target word count for generated articles
pub const DEFAULT_TARGET_WORD_COUNT: usize = 2000;
