//! Content idea handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use perdia_common::{
    auth::AuthContext,
    db::models::{ContentIdea, IdeaStatus},
    db::Repository,
    errors::{AppError, Result},
    providers::DataForSeoClient,
};

/// Request to create a content idea by hand
#[derive(Debug, Deserialize, Validate)]
pub struct CreateIdeaRequest {
    #[validate(length(min = 1, max = 500))]
    pub title: String,

    /// Topic keywords used for contributor and monetization matching
    #[serde(default)]
    pub topics: Vec<String>,

    #[validate(length(min = 1, max = 100))]
    pub content_type: String,

    pub notes: Option<String>,
}

/// Request to seed ideas from keyword research
#[derive(Debug, Deserialize, Validate)]
pub struct DiscoverIdeasRequest {
    /// Seed keywords sent to the keyword vendor
    #[validate(length(min = 1, max = 20))]
    pub seeds: Vec<String>,

    /// Content type applied to every suggested idea
    #[serde(default = "default_content_type")]
    pub content_type: String,

    /// Minimum monthly search volume to keep a suggestion
    #[serde(default = "default_min_search_volume")]
    pub min_search_volume: i64,
}

fn default_content_type() -> String {
    "guide".to_string()
}

fn default_min_search_volume() -> i64 {
    100
}

#[derive(Debug, Deserialize)]
pub struct ListIdeasQuery {
    pub status: Option<String>,
    #[serde(default)]
    pub offset: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    20
}

#[derive(Serialize)]
pub struct IdeaResponse {
    pub id: Uuid,
    pub title: String,
    pub topics: Vec<String>,
    pub content_type: String,
    pub status: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_volume: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: String,
}

impl From<ContentIdea> for IdeaResponse {
    fn from(idea: ContentIdea) -> Self {
        let topics = idea.topic_list();
        Self {
            id: idea.id,
            title: idea.title,
            topics,
            content_type: idea.content_type,
            status: idea.status,
            source: idea.source,
            search_volume: idea.search_volume,
            notes: idea.notes,
            created_at: idea.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct IdeaListResponse {
    pub ideas: Vec<IdeaResponse>,
    pub total: u64,
}

#[derive(Serialize)]
pub struct DiscoverResponse {
    pub created: usize,
    pub skipped_duplicates: usize,
    pub skipped_low_volume: usize,
}

/// Create a content idea manually
pub async fn create_idea(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<CreateIdeaRequest>,
) -> Result<(StatusCode, Json<IdeaResponse>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = Repository::new(state.db.clone());

    if repo.idea_title_exists(&request.title).await? {
        return Err(AppError::Conflict {
            message: format!("An idea titled \"{}\" already exists", request.title),
        });
    }

    let idea = repo
        .create_idea(
            request.title,
            request.topics,
            request.content_type,
            "manual".to_string(),
            None,
            request.notes,
        )
        .await?;

    tracing::info!(
        idea_id = %idea.id,
        request_id = %auth.request_id,
        "Content idea created"
    );

    Ok((StatusCode::CREATED, Json(idea.into())))
}

/// List ideas, optionally filtered by status
pub async fn list_ideas(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(query): Query<ListIdeasQuery>,
) -> Result<Json<IdeaListResponse>> {
    let status = query
        .status
        .as_deref()
        .map(parse_idea_status)
        .transpose()?;

    let repo = Repository::new(state.db.clone());
    let (ideas, total) = repo
        .list_ideas(status, query.offset, query.limit.clamp(1, 100))
        .await?;

    Ok(Json(IdeaListResponse {
        ideas: ideas.into_iter().map(Into::into).collect(),
        total,
    }))
}

/// Get a single idea
pub async fn get_idea(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(idea_id): Path<Uuid>,
) -> Result<Json<IdeaResponse>> {
    let repo = Repository::new(state.db.clone());

    let idea = repo
        .find_idea_by_id(idea_id)
        .await?
        .ok_or_else(|| AppError::IdeaNotFound {
            id: idea_id.to_string(),
        })?;

    Ok(Json(idea.into()))
}

/// Approve a pending idea, making it eligible for generation
pub async fn approve_idea(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(idea_id): Path<Uuid>,
) -> Result<Json<IdeaResponse>> {
    let repo = Repository::new(state.db.clone());
    let idea = repo.transition_idea(idea_id, IdeaStatus::Approved).await?;

    tracing::info!(
        idea_id = %idea_id,
        request_id = %auth.request_id,
        "Idea approved"
    );

    Ok(Json(idea.into()))
}

/// Reject a pending idea
pub async fn reject_idea(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(idea_id): Path<Uuid>,
) -> Result<Json<IdeaResponse>> {
    let repo = Repository::new(state.db.clone());
    let idea = repo.transition_idea(idea_id, IdeaStatus::Rejected).await?;

    tracing::info!(
        idea_id = %idea_id,
        request_id = %auth.request_id,
        "Idea rejected"
    );

    Ok(Json(idea.into()))
}

/// Pull keyword suggestions from the research vendor and store the
/// keepers as pending ideas
pub async fn discover_ideas(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<DiscoverIdeasRequest>,
) -> Result<Json<DiscoverResponse>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let credentials = state
        .config
        .providers
        .dataforseo
        .api_key
        .as_deref()
        .ok_or_else(|| AppError::Configuration {
            message: "DataForSEO credentials not configured".to_string(),
        })?;

    let client = DataForSeoClient::new(
        credentials,
        state.config.providers.dataforseo.api_base.clone(),
        state.config.providers.dataforseo.timeout_secs,
        state.config.providers.dataforseo.max_retries,
    )?;

    let suggestions = client.keyword_suggestions(&request.seeds).await?;

    let repo = Repository::new(state.db.clone());
    let mut created = 0;
    let mut skipped_duplicates = 0;
    let mut skipped_low_volume = 0;

    for suggestion in suggestions {
        let volume = suggestion.search_volume.unwrap_or(0);
        if volume < request.min_search_volume {
            skipped_low_volume += 1;
            continue;
        }

        let title = title_case(&suggestion.keyword);
        if repo.idea_title_exists(&title).await? {
            skipped_duplicates += 1;
            continue;
        }

        repo.create_idea(
            title,
            vec![suggestion.keyword.clone()],
            request.content_type.clone(),
            "ai_suggested".to_string(),
            suggestion.search_volume,
            None,
        )
        .await?;
        created += 1;
    }

    tracing::info!(
        created,
        skipped_duplicates,
        skipped_low_volume,
        request_id = %auth.request_id,
        "Idea discovery completed"
    );

    Ok(Json(DiscoverResponse {
        created,
        skipped_duplicates,
        skipped_low_volume,
    }))
}

fn parse_idea_status(raw: &str) -> Result<IdeaStatus> {
    match raw {
        "pending" => Ok(IdeaStatus::Pending),
        "approved" => Ok(IdeaStatus::Approved),
        "rejected" => Ok(IdeaStatus::Rejected),
        "completed" => Ok(IdeaStatus::Completed),
        other => Err(AppError::InvalidFormat {
            message: format!("Unknown idea status: {}", other),
        }),
    }
}

/// Turn a keyword phrase into a presentable idea title
fn title_case(keyword: &str) -> String {
    keyword
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("is an mba worth it"), "Is An Mba Worth It");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_parse_idea_status_rejects_unknown() {
        assert!(parse_idea_status("pending").is_ok());
        assert!(parse_idea_status("bogus").is_err());
    }
}
