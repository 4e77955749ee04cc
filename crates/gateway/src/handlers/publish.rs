//! WordPress publishing handlers
//!
//! Single-article publish for the review screen, plus the cron-driven
//! auto-publish endpoint that drains the approved queue up to the
//! per-run cap.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::AppState;
use perdia_common::{
    auth::AuthContext,
    contributors::default_contributors,
    db::models::Article,
    db::Repository,
    errors::{AppError, Result},
    metrics::record_publish,
    providers::{PublishPayload, WordPressClient},
};

#[derive(Serialize)]
pub struct PublishResponse {
    pub article_id: Uuid,
    pub wordpress_post_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Serialize)]
pub struct AutoPublishResponse {
    pub published: usize,
    pub failed: usize,
    pub results: Vec<AutoPublishResult>,
}

#[derive(Serialize)]
pub struct AutoPublishResult {
    pub article_id: Uuid,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wordpress_post_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Publish a single approved article
pub async fn publish_article(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(article_id): Path<Uuid>,
) -> Result<Json<PublishResponse>> {
    let repo = Repository::new(state.db.clone());

    let article = repo
        .find_article_by_id(article_id)
        .await?
        .ok_or_else(|| AppError::ArticleNotFound {
            id: article_id.to_string(),
        })?;

    let client = WordPressClient::from_config(&state.config.wordpress)?;
    let published = push_to_wordpress(&repo, &client, &article).await?;

    record_publish("manual");
    tracing::info!(
        article_id = %article_id,
        wordpress_post_id = published.wordpress_post_id,
        request_id = %auth.request_id,
        "Article published"
    );

    Ok(Json(published))
}

/// Cron entry point: publish approved articles meeting the quality bar,
/// oldest first, up to the per-run cap. Per-article failures are
/// reported, never fatal to the run.
pub async fn auto_publish(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<AutoPublishResponse>> {
    let repo = Repository::new(state.db.clone());
    let client = WordPressClient::from_config(&state.config.wordpress)?;

    let candidates = repo
        .list_publish_candidates(
            state.config.pipeline.quality_threshold,
            state.config.pipeline.auto_publish_cap as u64,
        )
        .await?;

    let mut results = Vec::with_capacity(candidates.len());
    let mut published = 0;
    let mut failed = 0;

    for article in candidates {
        let article_id = article.id;
        match push_to_wordpress(&repo, &client, &article).await {
            Ok(response) => {
                record_publish("auto");
                published += 1;
                results.push(AutoPublishResult {
                    article_id,
                    status: "published".to_string(),
                    wordpress_post_id: Some(response.wordpress_post_id),
                    error: None,
                });
            }
            Err(e) => {
                tracing::error!(
                    article_id = %article_id,
                    error = %e,
                    "Auto-publish failed for article"
                );
                failed += 1;
                results.push(AutoPublishResult {
                    article_id,
                    status: "failed".to_string(),
                    wordpress_post_id: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    tracing::info!(
        published,
        failed,
        request_id = %auth.request_id,
        "Auto-publish run completed"
    );

    Ok(Json(AutoPublishResponse {
        published,
        failed,
        results,
    }))
}

/// Create the remote post and record the publish locally
async fn push_to_wordpress(
    repo: &Repository,
    client: &WordPressClient,
    article: &Article,
) -> Result<PublishResponse> {
    let author = resolve_author(repo, &article.contributor_key).await?;

    let payload = PublishPayload {
        title: article.title.clone(),
        slug: article.slug.clone(),
        content: article.html.clone(),
        excerpt: article.excerpt.clone(),
        author,
        status: "publish".to_string(),
    };

    let post = client.create_post(&payload).await?;
    repo.mark_article_published(article.id, post.id).await?;

    Ok(PublishResponse {
        article_id: article.id,
        wordpress_post_id: post.id,
        link: post.link,
    })
}

/// Map a contributor key to its WordPress author account
async fn resolve_author(repo: &Repository, contributor_key: &str) -> Result<i64> {
    if let Ok(contributors) = repo.list_contributors().await {
        if let Some(found) = contributors.iter().find(|c| c.key == contributor_key) {
            return Ok(found.wordpress_author_id);
        }
    }

    default_contributors()
        .iter()
        .find(|c| c.key == contributor_key)
        .map(|c| c.wordpress_author_id)
        .ok_or_else(|| AppError::PublishError {
            message: format!("No WordPress author mapped for contributor {}", contributor_key),
        })
}
