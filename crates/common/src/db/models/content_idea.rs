//! Content idea entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Idea status enum
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdeaStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl From<String> for IdeaStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => IdeaStatus::Pending,
            "approved" => IdeaStatus::Approved,
            "rejected" => IdeaStatus::Rejected,
            "completed" => IdeaStatus::Completed,
            _ => IdeaStatus::Pending,
        }
    }
}

impl From<IdeaStatus> for String {
    fn from(status: IdeaStatus) -> Self {
        match status {
            IdeaStatus::Pending => "pending".to_string(),
            IdeaStatus::Approved => "approved".to_string(),
            IdeaStatus::Rejected => "rejected".to_string(),
            IdeaStatus::Completed => "completed".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "content_ideas")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    /// Topic keywords as a JSON array of strings
    #[sea_orm(column_type = "JsonBinary")]
    pub topics: serde_json::Value,

    /// Content type (how-to, listicle, career-guide, comparison, ...)
    #[sea_orm(column_type = "Text")]
    pub content_type: String,

    #[sea_orm(column_type = "Text")]
    pub status: String,

    /// Where the idea came from: manual or ai_suggested
    #[sea_orm(column_type = "Text")]
    pub source: String,

    /// Monthly search volume reported by the keyword provider
    pub search_volume: Option<i64>,

    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Get the idea status as an enum
    pub fn idea_status(&self) -> IdeaStatus {
        IdeaStatus::from(self.status.clone())
    }

    /// Topic keywords as plain strings
    pub fn topic_list(&self) -> Vec<String> {
        self.topics
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Check whether the idea can be queued for generation
    pub fn is_generatable(&self) -> bool {
        self.idea_status() == IdeaStatus::Approved
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::generation_job::Entity")]
    GenerationJobs,

    #[sea_orm(has_many = "super::article::Entity")]
    Articles,
}

impl Related<super::generation_job::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GenerationJobs.def()
    }
}

impl Related<super::article::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Articles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
