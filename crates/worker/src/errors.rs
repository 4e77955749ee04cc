//! Generation worker error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Draft failed validation twice; no article was produced
    #[error("Draft rejected: {0}")]
    DraftRejected(String),

    #[error("Provider error in {stage}: {message}")]
    ProviderError { stage: String, message: String },

    #[error("Humanization failed: {0}")]
    HumanizeFailed(String),

    /// Cancellation observed at a stage boundary
    #[error("Job cancelled at stage {0}")]
    Cancelled(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Idea not found: {0}")]
    IdeaNotFound(uuid::Uuid),

    #[error("Idea {id} is not generatable (status {status})")]
    IdeaNotGeneratable { id: uuid::Uuid, status: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl PipelineError {
    /// True when the failure ends the job without producing an article
    /// but should not trip the worker circuit breaker
    pub fn is_cancellation(&self) -> bool {
        matches!(self, PipelineError::Cancelled(_))
    }
}

impl From<perdia_common::errors::AppError> for PipelineError {
    fn from(e: perdia_common::errors::AppError) -> Self {
        use perdia_common::errors::AppError;
        match e {
            AppError::Database(err) => PipelineError::DatabaseError(err.to_string()),
            AppError::HumanizeFailed { message } => PipelineError::HumanizeFailed(message),
            AppError::Provider { provider, message } => PipelineError::ProviderError {
                stage: provider,
                message,
            },
            other => PipelineError::DatabaseError(other.to_string()),
        }
    }
}
