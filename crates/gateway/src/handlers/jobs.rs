//! Generation job handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use perdia_common::{
    auth::AuthContext,
    db::models::{GenerationJob, JobOptions},
    db::Repository,
    errors::{AppError, Result},
};

/// Request to enqueue generation for an approved idea
#[derive(Debug, Deserialize)]
pub struct EnqueueRequest {
    pub idea_id: Uuid,

    /// Per-job overrides; pipeline defaults apply when omitted
    pub target_word_count: Option<usize>,
    pub max_fix_attempts: Option<u32>,
    pub quality_threshold: Option<i32>,
}

#[derive(Serialize)]
pub struct EnqueueResponse {
    pub job_id: Uuid,
    pub status: String,
    pub poll_url: String,
}

/// Job status response
#[derive(Serialize)]
pub struct JobResponse {
    pub job_id: Uuid,
    pub idea_id: Uuid,
    pub status: String,
    pub stage: String,
    pub progress_percent: i32,
    pub attempt_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    pub created_at: String,
}

impl From<GenerationJob> for JobResponse {
    fn from(job: GenerationJob) -> Self {
        Self {
            job_id: job.id,
            idea_id: job.idea_id,
            status: job.status,
            stage: job.stage,
            progress_percent: job.progress_percent,
            attempt_count: job.attempt_count,
            article_id: job.article_id,
            error_message: job.error_message,
            started_at: job.started_at.map(|dt| dt.to_rfc3339()),
            completed_at: job.completed_at.map(|dt| dt.to_rfc3339()),
            created_at: job.created_at.to_rfc3339(),
        }
    }
}

/// Enqueue a generation job for an approved idea. Returns 409 when a
/// live job already exists for the idea.
pub async fn enqueue_generation(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<EnqueueRequest>,
) -> Result<(StatusCode, Json<EnqueueResponse>)> {
    let repo = Repository::new(state.db.clone());

    let idea = repo
        .find_idea_by_id(request.idea_id)
        .await?
        .ok_or_else(|| AppError::IdeaNotFound {
            id: request.idea_id.to_string(),
        })?;

    if !idea.is_generatable() {
        return Err(AppError::InvalidTransition {
            from: idea.status.clone(),
            to: "generating".to_string(),
        });
    }

    let defaults = &state.config.pipeline;
    let options = JobOptions {
        target_word_count: request
            .target_word_count
            .unwrap_or(defaults.target_word_count),
        max_fix_attempts: request.max_fix_attempts.unwrap_or(defaults.max_fix_attempts),
        quality_threshold: request
            .quality_threshold
            .unwrap_or(defaults.quality_threshold),
    };

    let job = repo.create_job(idea.id, options).await?;

    tracing::info!(
        job_id = %job.id,
        idea_id = %idea.id,
        request_id = %auth.request_id,
        "Generation job enqueued"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(EnqueueResponse {
            job_id: job.id,
            status: job.status,
            poll_url: format!("/v1/jobs/{}", job.id),
        }),
    ))
}

/// Get job status for dashboard polling
pub async fn get_job(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobResponse>> {
    let repo = Repository::new(state.db.clone());

    let job = repo
        .find_job_by_id(job_id)
        .await?
        .ok_or_else(|| AppError::JobNotFound {
            id: job_id.to_string(),
        })?;

    Ok(Json(job.into()))
}

/// Request cancellation. Pending jobs cancel immediately; running jobs
/// stop at the next stage boundary.
pub async fn cancel_job(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobResponse>> {
    let repo = Repository::new(state.db.clone());
    let job = repo.request_job_cancel(job_id).await?;

    tracing::info!(
        job_id = %job_id,
        status = %job.status,
        request_id = %auth.request_id,
        "Job cancellation requested"
    );

    Ok(Json(job.into()))
}
