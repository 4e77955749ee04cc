//! Configuration management for Perdia services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config.toml, config.yaml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// AI provider configuration
    pub providers: ProvidersConfig,

    /// Generation pipeline configuration
    pub pipeline: PipelineConfig,

    /// WordPress publishing configuration
    pub wordpress: WordPressConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,

    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Shutdown timeout in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Primary database URL (for writes)
    pub url: String,

    /// Read replica URL (optional, falls back to primary)
    pub read_url: Option<String>,

    /// Maximum number of connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Idle timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

/// Per-vendor API settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProvidersConfig {
    /// Grok (draft generation, primary)
    pub grok: ProviderConfig,

    /// Claude (draft fallback + humanization fallback)
    pub claude: ProviderConfig,

    /// StealthGPT (humanization, primary)
    pub stealthgpt: ProviderConfig,

    /// DataForSEO (keyword discovery); basic auth login:password in api_key
    pub dataforseo: ProviderConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// API key / token
    pub api_key: Option<String>,

    /// API base URL (for custom endpoints)
    pub api_base: Option<String>,

    /// Model to use (where the vendor is model-addressed)
    pub model: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries per call
    #[serde(default = "default_provider_retries")]
    pub max_retries: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Target word count for drafts
    #[serde(default = "default_target_word_count")]
    pub target_word_count: usize,

    /// Maximum auto-fix iterations in the quality loop
    #[serde(default = "default_max_fix_attempts")]
    pub max_fix_attempts: u32,

    /// Minimum quality score for auto-publish eligibility
    #[serde(default = "default_quality_threshold")]
    pub quality_threshold: i32,

    /// Fixed pause between pipeline stages, in milliseconds
    #[serde(default = "default_stage_delay_ms")]
    pub stage_delay_ms: u64,

    /// Maximum internal links inserted per article
    #[serde(default = "default_max_internal_links")]
    pub max_internal_links: usize,

    /// CTA shortcode placements per article (1 or 2)
    #[serde(default = "default_shortcode_placements")]
    pub shortcode_placements: usize,

    /// Poll interval for the worker queue, in seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Maximum articles published per auto-publish run
    #[serde(default = "default_auto_publish_cap")]
    pub auto_publish_cap: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WordPressConfig {
    /// WordPress site base URL (e.g. https://example.com)
    pub base_url: Option<String>,

    /// WordPress username for the application password
    pub username: Option<String>,

    /// WordPress application password
    pub app_password: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// API key accepted by the gateway (plaintext; hashed at startup)
    pub api_key: Option<String>,

    /// API key header name
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,

    /// Request ID header name
    #[serde(default = "default_request_id_header")]
    pub request_id_header: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Metrics port (0 to disable)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Requests per second
    #[serde(default = "default_rate_limit")]
    pub requests_per_second: u32,

    /// Burst capacity
    #[serde(default = "default_burst")]
    pub burst: u32,

    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_request_timeout() -> u64 { 120 }
fn default_shutdown_timeout() -> u64 { 30 }
fn default_max_connections() -> u32 { 20 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 10 }
fn default_idle_timeout() -> u64 { 300 }
fn default_provider_timeout() -> u64 { 120 }
fn default_provider_retries() -> u32 { 3 }
fn default_target_word_count() -> usize { 2000 }
fn default_max_fix_attempts() -> u32 { 3 }
fn default_quality_threshold() -> i32 { 80 }
fn default_stage_delay_ms() -> u64 { 500 }
fn default_max_internal_links() -> usize { 5 }
fn default_shortcode_placements() -> usize { 1 }
fn default_poll_interval() -> u64 { 5 }
fn default_auto_publish_cap() -> usize { 3 }
fn default_api_key_header() -> String { "X-Api-Key".to_string() }
fn default_request_id_header() -> String { "X-Request-ID".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_port() -> u16 { 9090 }
fn default_service_name() -> String { "perdia".to_string() }
fn default_rate_limit() -> u32 { 50 }
fn default_burst() -> u32 { 100 }
fn default_enabled() -> bool { true }

fn default_provider_config() -> ProviderConfig {
    ProviderConfig {
        api_key: None,
        api_base: None,
        model: None,
        timeout_secs: default_provider_timeout(),
        max_retries: default_provider_retries(),
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?

            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__PIPELINE__MAX_FIX_ATTEMPTS=5
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_secs)
    }

    /// Get the inter-stage pipeline delay as Duration
    pub fn stage_delay(&self) -> Duration {
        Duration::from_millis(self.pipeline.stage_delay_ms)
    }

    /// Get the worker poll interval as Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.pipeline.poll_interval_secs)
    }

    /// Get the read database URL (falls back to primary)
    pub fn read_database_url(&self) -> &str {
        self.database.read_url.as_deref().unwrap_or(&self.database.url)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                request_timeout_secs: default_request_timeout(),
                shutdown_timeout_secs: default_shutdown_timeout(),
            },
            database: DatabaseConfig {
                url: "postgres://localhost/perdia".to_string(),
                read_url: None,
                max_connections: default_max_connections(),
                min_connections: default_min_connections(),
                connect_timeout_secs: default_connect_timeout(),
                idle_timeout_secs: default_idle_timeout(),
            },
            providers: ProvidersConfig {
                grok: ProviderConfig {
                    model: Some(crate::DEFAULT_DRAFT_MODEL.to_string()),
                    ..default_provider_config()
                },
                claude: ProviderConfig {
                    model: Some(crate::DEFAULT_FALLBACK_MODEL.to_string()),
                    ..default_provider_config()
                },
                stealthgpt: default_provider_config(),
                dataforseo: default_provider_config(),
            },
            pipeline: PipelineConfig {
                target_word_count: default_target_word_count(),
                max_fix_attempts: default_max_fix_attempts(),
                quality_threshold: default_quality_threshold(),
                stage_delay_ms: default_stage_delay_ms(),
                max_internal_links: default_max_internal_links(),
                shortcode_placements: default_shortcode_placements(),
                poll_interval_secs: default_poll_interval(),
                auto_publish_cap: default_auto_publish_cap(),
            },
            wordpress: WordPressConfig {
                base_url: None,
                username: None,
                app_password: None,
                timeout_secs: default_provider_timeout(),
            },
            auth: AuthConfig {
                api_key: None,
                api_key_header: default_api_key_header(),
                request_id_header: default_request_id_header(),
            },
            observability: ObservabilityConfig {
                log_level: default_log_level(),
                json_logging: default_json_logging(),
                metrics_port: default_metrics_port(),
                service_name: default_service_name(),
            },
            rate_limit: RateLimitConfig {
                requests_per_second: default_rate_limit(),
                burst: default_burst(),
                enabled: default_enabled(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.pipeline.target_word_count, 2000);
        assert_eq!(config.pipeline.max_fix_attempts, 3);
        assert_eq!(config.providers.grok.model.as_deref(), Some("grok-2-latest"));
    }

    #[test]
    fn test_read_database_fallback() {
        let config = AppConfig::default();
        assert_eq!(config.read_database_url(), "postgres://localhost/perdia");
    }

    #[test]
    fn test_stage_delay() {
        let config = AppConfig::default();
        assert_eq!(config.stage_delay(), Duration::from_millis(500));
    }
}
