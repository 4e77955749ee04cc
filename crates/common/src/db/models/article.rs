//! Article entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Article status enum
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    Draft,
    Review,
    Approved,
    Scheduled,
    Published,
    Archived,
}

impl From<String> for ArticleStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "draft" => ArticleStatus::Draft,
            "review" => ArticleStatus::Review,
            "approved" => ArticleStatus::Approved,
            "scheduled" => ArticleStatus::Scheduled,
            "published" => ArticleStatus::Published,
            "archived" => ArticleStatus::Archived,
            _ => ArticleStatus::Draft,
        }
    }
}

impl From<ArticleStatus> for String {
    fn from(status: ArticleStatus) -> Self {
        match status {
            ArticleStatus::Draft => "draft".to_string(),
            ArticleStatus::Review => "review".to_string(),
            ArticleStatus::Approved => "approved".to_string(),
            ArticleStatus::Scheduled => "scheduled".to_string(),
            ArticleStatus::Published => "published".to_string(),
            ArticleStatus::Archived => "archived".to_string(),
        }
    }
}

impl ArticleStatus {
    /// Published and archived articles can no longer change state
    pub fn is_terminal(&self) -> bool {
        matches!(self, ArticleStatus::Published | ArticleStatus::Archived)
    }

    /// Only articles that cleared review may be pushed to WordPress
    pub fn is_publishable(&self) -> bool {
        matches!(self, ArticleStatus::Approved | ArticleStatus::Scheduled)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "articles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub idea_id: Option<Uuid>,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub slug: String,

    /// Full article body as HTML
    #[sea_orm(column_type = "Text")]
    pub html: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub excerpt: Option<String>,

    /// Stable key of the assigned contributor persona
    #[sea_orm(column_type = "Text")]
    pub contributor_key: String,

    pub word_count: i32,

    /// Heuristic quality score, 0..=100
    pub quality_score: i32,

    /// Unresolved quality issues flagged for human review
    #[sea_orm(column_type = "JsonBinary")]
    pub risk_flags: serde_json::Value,

    pub internal_link_count: i32,

    pub external_link_count: i32,

    pub monetization_program_id: Option<Uuid>,

    #[sea_orm(column_type = "Text")]
    pub status: String,

    /// Remote post ID once published to WordPress
    pub wordpress_post_id: Option<i64>,

    pub published_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Get the article status as an enum
    pub fn article_status(&self) -> ArticleStatus {
        ArticleStatus::from(self.status.clone())
    }

    /// Risk flags as plain strings
    pub fn flag_list(&self) -> Vec<String> {
        self.risk_flags
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
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
        belongs_to = "super::monetization_program::Entity",
        from = "Column::MonetizationProgramId",
        to = "super::monetization_program::Column::Id"
    )]
    MonetizationProgram,
}

impl Related<super::content_idea::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Idea.def()
    }
}

impl Related<super::monetization_program::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MonetizationProgram.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_post_review_states_are_publishable() {
        assert!(ArticleStatus::Approved.is_publishable());
        assert!(ArticleStatus::Scheduled.is_publishable());
        assert!(!ArticleStatus::Review.is_publishable());
        assert!(!ArticleStatus::Published.is_publishable());
        assert!(!ArticleStatus::Archived.is_publishable());
    }
}
