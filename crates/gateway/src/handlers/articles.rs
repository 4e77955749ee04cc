//! Article review handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use perdia_common::{
    auth::AuthContext,
    db::models::{Article, ArticleStatus},
    db::Repository,
    errors::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct ListArticlesQuery {
    pub status: Option<String>,
    #[serde(default)]
    pub offset: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    20
}

/// Summary row for list views; the HTML body stays out of the payload
#[derive(Serialize)]
pub struct ArticleSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub status: String,
    pub contributor_key: String,
    pub word_count: i32,
    pub quality_score: i32,
    pub risk_flags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wordpress_post_id: Option<i64>,
    pub created_at: String,
}

impl From<Article> for ArticleSummary {
    fn from(article: Article) -> Self {
        let risk_flags = article.flag_list();
        Self {
            id: article.id,
            title: article.title,
            slug: article.slug,
            status: article.status,
            contributor_key: article.contributor_key,
            word_count: article.word_count,
            quality_score: article.quality_score,
            risk_flags,
            wordpress_post_id: article.wordpress_post_id,
            created_at: article.created_at.to_rfc3339(),
        }
    }
}

/// Full article payload for the review screen
#[derive(Serialize)]
pub struct ArticleResponse {
    #[serde(flatten)]
    pub summary: ArticleSummary,
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    pub internal_link_count: i32,
    pub external_link_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monetization_program_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

impl From<Article> for ArticleResponse {
    fn from(article: Article) -> Self {
        let html = article.html.clone();
        let excerpt = article.excerpt.clone();
        let internal_link_count = article.internal_link_count;
        let external_link_count = article.external_link_count;
        let monetization_program_id = article.monetization_program_id;
        let published_at = article.published_at.map(|dt| dt.to_rfc3339());
        Self {
            summary: article.into(),
            html,
            excerpt,
            internal_link_count,
            external_link_count,
            monetization_program_id,
            published_at,
        }
    }
}

#[derive(Serialize)]
pub struct ArticleListResponse {
    pub articles: Vec<ArticleSummary>,
    pub total: u64,
}

/// List articles, optionally filtered by status
pub async fn list_articles(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(query): Query<ListArticlesQuery>,
) -> Result<Json<ArticleListResponse>> {
    let status = query
        .status
        .as_deref()
        .map(parse_article_status)
        .transpose()?;

    let repo = Repository::new(state.db.clone());
    let (articles, total) = repo
        .list_articles(status, query.offset, query.limit.clamp(1, 100))
        .await?;

    Ok(Json(ArticleListResponse {
        articles: articles.into_iter().map(Into::into).collect(),
        total,
    }))
}

/// Get a full article for review
pub async fn get_article(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(article_id): Path<Uuid>,
) -> Result<Json<ArticleResponse>> {
    let repo = Repository::new(state.db.clone());

    let article = repo
        .find_article_by_id(article_id)
        .await?
        .ok_or_else(|| AppError::ArticleNotFound {
            id: article_id.to_string(),
        })?;

    Ok(Json(article.into()))
}

/// Approve a reviewed article, making it publish-eligible
pub async fn approve_article(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(article_id): Path<Uuid>,
) -> Result<Json<ArticleSummary>> {
    let repo = Repository::new(state.db.clone());
    let article = repo
        .transition_article(article_id, ArticleStatus::Approved)
        .await?;

    tracing::info!(
        article_id = %article_id,
        request_id = %auth.request_id,
        "Article approved"
    );

    Ok(Json(article.into()))
}

/// Archive an article, removing it from every queue
pub async fn archive_article(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(article_id): Path<Uuid>,
) -> Result<Json<ArticleSummary>> {
    let repo = Repository::new(state.db.clone());
    let article = repo
        .transition_article(article_id, ArticleStatus::Archived)
        .await?;

    tracing::info!(
        article_id = %article_id,
        request_id = %auth.request_id,
        "Article archived"
    );

    Ok(Json(article.into()))
}

fn parse_article_status(raw: &str) -> Result<ArticleStatus> {
    match raw {
        "draft" => Ok(ArticleStatus::Draft),
        "review" => Ok(ArticleStatus::Review),
        "approved" => Ok(ArticleStatus::Approved),
        "scheduled" => Ok(ArticleStatus::Scheduled),
        "published" => Ok(ArticleStatus::Published),
        "archived" => Ok(ArticleStatus::Archived),
        other => Err(AppError::InvalidFormat {
            message: format!("Unknown article status: {}", other),
        }),
    }
}
