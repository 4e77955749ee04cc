//! Authentication utilities
//!
//! Perdia is a single-team internal tool: the gateway accepts one
//! operator API key, configured at startup and compared by SHA-256
//! hash. The extractor also threads the request ID through for logs.

use crate::errors::{AppError, Result};
use axum::{extract::FromRequestParts, http::request::Parts};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Extracted authentication context available to handlers
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Request ID for tracing
    pub request_id: String,
}

/// Header carrying the operator API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Hash an API key for comparison
pub fn hash_api_key(api_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Validate an API key against a stored hash
pub fn validate_api_key(api_key: &str, stored_hash: &str) -> bool {
    hash_api_key(api_key) == stored_hash
}

/// Generate a new operator API key
pub fn generate_api_key() -> String {
    let random_bytes: [u8; 32] = rand::random();
    format!("pk_{}", hex::encode(random_bytes))
}

/// Key validator shared through gateway state
#[derive(Debug, Clone)]
pub struct ApiKeyValidator {
    /// SHA-256 hex of the configured key; None disables auth (dev mode)
    key_hash: Option<String>,
}

impl ApiKeyValidator {
    pub fn new(configured_key: Option<&str>) -> Self {
        Self {
            key_hash: configured_key.map(hash_api_key),
        }
    }

    pub fn enabled(&self) -> bool {
        self.key_hash.is_some()
    }

    /// Check a presented key
    pub fn check(&self, presented: Option<&str>) -> Result<()> {
        let Some(ref hash) = self.key_hash else {
            return Ok(());
        };

        match presented {
            Some(key) if validate_api_key(key, hash) => Ok(()),
            Some(_) => Err(AppError::InvalidApiKey),
            None => Err(AppError::Unauthorized {
                message: format!("Missing {} header", API_KEY_HEADER),
            }),
        }
    }
}

/// Axum extractor for AuthContext
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let request_id = parts
            .headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Ok(AuthContext { request_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_api_key() {
        let key = "pk_test_12345";
        let hash = hash_api_key(key);
        assert!(validate_api_key(key, &hash));
        assert!(!validate_api_key("wrong_key", &hash));
    }

    #[test]
    fn test_generate_api_key() {
        let key = generate_api_key();
        assert!(key.starts_with("pk_"));
        assert!(key.len() > 10);
    }

    #[test]
    fn test_validator_disabled_allows_all() {
        let validator = ApiKeyValidator::new(None);
        assert!(!validator.enabled());
        assert!(validator.check(None).is_ok());
        assert!(validator.check(Some("anything")).is_ok());
    }

    #[test]
    fn test_validator_rejects_wrong_key() {
        let validator = ApiKeyValidator::new(Some("pk_secret"));
        assert!(validator.check(Some("pk_secret")).is_ok());
        assert!(matches!(
            validator.check(Some("pk_wrong")),
            Err(AppError::InvalidApiKey)
        ));
        assert!(matches!(
            validator.check(None),
            Err(AppError::Unauthorized { .. })
        ));
    }
}
