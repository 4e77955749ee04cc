//! Generation job entity
//!
//! This table is the work queue: the worker claims pending rows with
//! FOR UPDATE SKIP LOCKED and writes per-stage progress back for UI polling.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Job status enum
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Cancelling,
    Cancelled,
    Completed,
    Failed,
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => JobStatus::Pending,
            "running" => JobStatus::Running,
            "cancelling" => JobStatus::Cancelling,
            "cancelled" => JobStatus::Cancelled,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            _ => JobStatus::Pending,
        }
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Pending => "pending".to_string(),
            JobStatus::Running => "running".to_string(),
            JobStatus::Cancelling => "cancelling".to_string(),
            JobStatus::Cancelled => "cancelled".to_string(),
            JobStatus::Completed => "completed".to_string(),
            JobStatus::Failed => "failed".to_string(),
        }
    }
}

/// Per-job generation options, stored as JSONB on the row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobOptions {
    pub target_word_count: usize,
    pub max_fix_attempts: u32,
    pub quality_threshold: i32,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            target_word_count: crate::DEFAULT_TARGET_WORD_COUNT,
            max_fix_attempts: 3,
            quality_threshold: 80,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "generation_jobs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub idea_id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub status: String,

    /// Name of the pipeline stage currently executing
    #[sea_orm(column_type = "Text")]
    pub stage: String,

    pub progress_percent: i32,

    pub attempt_count: i32,

    pub article_id: Option<Uuid>,

    #[sea_orm(column_type = "Text", nullable)]
    pub error_message: Option<String>,

    #[sea_orm(column_type = "JsonBinary")]
    pub options: serde_json::Value,

    pub created_at: DateTimeWithTimeZone,

    pub started_at: Option<DateTimeWithTimeZone>,

    pub completed_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Get the job status as an enum
    pub fn job_status(&self) -> JobStatus {
        JobStatus::from(self.status.clone())
    }

    /// Check if the job is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.job_status(),
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    /// Check if the job can still be cancelled
    pub fn is_cancellable(&self) -> bool {
        matches!(self.job_status(), JobStatus::Pending | JobStatus::Running)
    }

    /// Deserialize the stored generation options
    pub fn job_options(&self) -> JobOptions {
        serde_json::from_value(self.options.clone()).unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::content_idea::Entity",
        from = "Column::IdeaId",
        to = "super::content_idea::Column::Id"
    )]
    Idea,

    #[sea_orm(
        belongs_to = "super::article::Entity",
        from = "Column::ArticleId",
        to = "super::article::Column::Id"
    )]
    Article,
}

impl Related<super::content_idea::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Idea.def()
    }
}

impl Related<super::article::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Article.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        let status = JobStatus::from("cancelling".to_string());
        assert_eq!(status, JobStatus::Cancelling);
        assert_eq!(String::from(status), "cancelling");
    }

    #[test]
    fn test_default_options() {
        let opts = JobOptions::default();
        assert_eq!(opts.target_word_count, 2000);
        assert_eq!(opts.max_fix_attempts, 3);
    }

    fn job_with_status(status: &str) -> Model {
        Model {
            id: Uuid::new_v4(),
            idea_id: Uuid::new_v4(),
            status: status.to_string(),
            stage: "queued".to_string(),
            progress_percent: 0,
            attempt_count: 0,
            article_id: None,
            error_message: None,
            options: serde_json::json!({}),
            created_at: chrono::Utc::now().into(),
            started_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn test_terminal_jobs_not_cancellable() {
        for status in ["completed", "failed", "cancelled"] {
            let job = job_with_status(status);
            assert!(job.is_terminal(), "{status} should be terminal");
            assert!(!job.is_cancellable(), "{status} should not be cancellable");
        }
        assert!(job_with_status("pending").is_cancellable());
        assert!(job_with_status("running").is_cancellable());
    }
}
