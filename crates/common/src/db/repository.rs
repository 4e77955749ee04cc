//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations
//! with proper error handling. Lifecycle transitions for ideas,
//! articles and jobs are enforced here so callers cannot move a
//! record into an illegal state.

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, Statement,
};
use uuid::Uuid;

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Content Idea Operations
    // ========================================================================

    /// Create a new content idea
    pub async fn create_idea(
        &self,
        title: String,
        topics: Vec<String>,
        content_type: String,
        source: String,
        search_volume: Option<i64>,
        notes: Option<String>,
    ) -> Result<ContentIdea> {
        let now = chrono::Utc::now();

        let idea = ContentIdeaActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title),
            topics: Set(serde_json::json!(topics)),
            content_type: Set(content_type),
            status: Set(IdeaStatus::Pending.into()),
            source: Set(source),
            search_volume: Set(search_volume),
            notes: Set(notes),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        idea.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Find idea by ID
    pub async fn find_idea_by_id(&self, id: Uuid) -> Result<Option<ContentIdea>> {
        ContentIdeaEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List ideas, optionally filtered by status, newest first
    pub async fn list_ideas(
        &self,
        status: Option<IdeaStatus>,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<ContentIdea>, u64)> {
        let mut query = ContentIdeaEntity::find();
        if let Some(status) = status {
            query = query.filter(ContentIdeaColumn::Status.eq(String::from(status)));
        }

        let query = query.order_by_desc(ContentIdeaColumn::CreatedAt);
        let total = query.clone().count(self.read_conn()).await?;

        // Item offset, not a page index
        let ideas = query
            .offset(offset)
            .limit(limit)
            .all(self.read_conn())
            .await?;

        Ok((ideas, total))
    }

    /// Move an idea through its lifecycle. Allowed transitions:
    /// pending -> approved | rejected, approved -> completed.
    pub async fn transition_idea(&self, id: Uuid, to: IdeaStatus) -> Result<ContentIdea> {
        let idea = self
            .find_idea_by_id(id)
            .await?
            .ok_or_else(|| AppError::IdeaNotFound { id: id.to_string() })?;

        let from = idea.idea_status();
        let allowed = matches!(
            (&from, &to),
            (IdeaStatus::Pending, IdeaStatus::Approved)
                | (IdeaStatus::Pending, IdeaStatus::Rejected)
                | (IdeaStatus::Approved, IdeaStatus::Completed)
        );
        if !allowed {
            return Err(AppError::InvalidTransition {
                from: String::from(from),
                to: String::from(to),
            });
        }

        let mut active: ContentIdeaActiveModel = idea.into();
        active.status = Set(String::from(to));
        active.updated_at = Set(chrono::Utc::now().into());

        active.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Check whether an idea title already exists (case-insensitive)
    pub async fn idea_title_exists(&self, title: &str) -> Result<bool> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT 1 FROM content_ideas WHERE lower(title) = lower($1) LIMIT 1",
            vec![title.into()],
        );
        let row = self.read_conn().query_one(stmt).await?;
        Ok(row.is_some())
    }

    // ========================================================================
    // Article Operations
    // ========================================================================

    /// Persist a freshly generated article
    #[allow(clippy::too_many_arguments)]
    pub async fn create_article(
        &self,
        idea_id: Option<Uuid>,
        title: String,
        slug: String,
        html: String,
        excerpt: Option<String>,
        contributor_key: String,
        word_count: i32,
        quality_score: i32,
        risk_flags: Vec<String>,
        internal_link_count: i32,
        external_link_count: i32,
        monetization_program_id: Option<Uuid>,
    ) -> Result<Article> {
        let now = chrono::Utc::now();

        let article = ArticleActiveModel {
            id: Set(Uuid::new_v4()),
            idea_id: Set(idea_id),
            title: Set(title),
            slug: Set(slug),
            html: Set(html),
            excerpt: Set(excerpt),
            contributor_key: Set(contributor_key),
            word_count: Set(word_count),
            quality_score: Set(quality_score),
            risk_flags: Set(serde_json::json!(risk_flags)),
            internal_link_count: Set(internal_link_count),
            external_link_count: Set(external_link_count),
            monetization_program_id: Set(monetization_program_id),
            status: Set(ArticleStatus::Review.into()),
            wordpress_post_id: Set(None),
            published_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        article.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Find article by ID
    pub async fn find_article_by_id(&self, id: Uuid) -> Result<Option<Article>> {
        ArticleEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List articles, optionally filtered by status, newest first
    pub async fn list_articles(
        &self,
        status: Option<ArticleStatus>,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<Article>, u64)> {
        let mut query = ArticleEntity::find();
        if let Some(status) = status {
            query = query.filter(ArticleColumn::Status.eq(String::from(status)));
        }

        let query = query.order_by_desc(ArticleColumn::CreatedAt);
        let total = query.clone().count(self.read_conn()).await?;

        // Item offset, not a page index
        let articles = query
            .offset(offset)
            .limit(limit)
            .all(self.read_conn())
            .await?;

        Ok((articles, total))
    }

    /// Move an article through review states. Terminal states are immutable.
    pub async fn transition_article(&self, id: Uuid, to: ArticleStatus) -> Result<Article> {
        let article = self
            .find_article_by_id(id)
            .await?
            .ok_or_else(|| AppError::ArticleNotFound { id: id.to_string() })?;

        let from = article.article_status();
        let allowed = !from.is_terminal()
            && matches!(
                (&from, &to),
                (ArticleStatus::Review, ArticleStatus::Approved)
                    | (ArticleStatus::Review, ArticleStatus::Archived)
                    | (ArticleStatus::Approved, ArticleStatus::Scheduled)
                    | (ArticleStatus::Approved, ArticleStatus::Archived)
                    | (ArticleStatus::Scheduled, ArticleStatus::Archived)
            );
        if !allowed {
            return Err(AppError::InvalidTransition {
                from: String::from(from),
                to: String::from(to),
            });
        }

        let mut active: ArticleActiveModel = article.into();
        active.status = Set(String::from(to));
        active.updated_at = Set(chrono::Utc::now().into());

        active.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Record a successful WordPress publish
    pub async fn mark_article_published(
        &self,
        id: Uuid,
        wordpress_post_id: i64,
    ) -> Result<Article> {
        let article = self
            .find_article_by_id(id)
            .await?
            .ok_or_else(|| AppError::ArticleNotFound { id: id.to_string() })?;

        // Publishing is only valid from the post-review states
        if !article.article_status().is_publishable() {
            return Err(AppError::InvalidTransition {
                from: article.status.clone(),
                to: ArticleStatus::Published.into(),
            });
        }

        let now = chrono::Utc::now();
        let mut active: ArticleActiveModel = article.into();
        active.status = Set(ArticleStatus::Published.into());
        active.wordpress_post_id = Set(Some(wordpress_post_id));
        active.published_at = Set(Some(now.into()));
        active.updated_at = Set(now.into());

        active.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Approved articles meeting the quality bar, oldest first, capped
    pub async fn list_publish_candidates(
        &self,
        quality_threshold: i32,
        limit: u64,
    ) -> Result<Vec<Article>> {
        ArticleEntity::find()
            .filter(ArticleColumn::Status.eq(String::from(ArticleStatus::Approved)))
            .filter(ArticleColumn::QualityScore.gte(quality_threshold))
            .order_by_asc(ArticleColumn::CreatedAt)
            .limit(limit)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Published (title, slug) pairs used as internal-link candidates
    pub async fn list_link_candidates(&self, limit: u64) -> Result<Vec<(String, String)>> {
        let articles = ArticleEntity::find()
            .filter(ArticleColumn::Status.eq(String::from(ArticleStatus::Published)))
            .order_by_desc(ArticleColumn::PublishedAt)
            .limit(limit)
            .all(self.read_conn())
            .await?;

        Ok(articles.into_iter().map(|a| (a.title, a.slug)).collect())
    }

    // ========================================================================
    // Generation Job Operations
    // ========================================================================

    /// Enqueue a generation job for an approved idea. One live job per
    /// idea: the insert and the liveness check run as a single statement
    /// so concurrent enqueues cannot double-queue.
    pub async fn create_job(&self, idea_id: Uuid, options: JobOptions) -> Result<GenerationJob> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            INSERT INTO generation_jobs
                (id, idea_id, status, stage, progress_percent, attempt_count,
                 options, created_at)
            SELECT $1, $2, 'pending', 'queued', 0, 0, $3, NOW()
            WHERE NOT EXISTS (
                SELECT 1 FROM generation_jobs
                WHERE idea_id = $2
                  AND status IN ('pending', 'running', 'cancelling')
            )
            RETURNING *
            "#,
            vec![
                Uuid::new_v4().into(),
                idea_id.into(),
                serde_json::to_value(options)?.into(),
            ],
        );

        GenerationJobEntity::find()
            .from_raw_sql(stmt)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::JobAlreadyQueued {
                idea_id: idea_id.to_string(),
            })
    }

    /// Find job by ID
    pub async fn find_job_by_id(&self, id: Uuid) -> Result<Option<GenerationJob>> {
        GenerationJobEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Atomically claim the oldest pending job. Multiple workers can poll
    /// concurrently; SKIP LOCKED guarantees each row is claimed once.
    pub async fn claim_next_job(&self) -> Result<Option<GenerationJob>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            UPDATE generation_jobs
            SET status = 'running',
                stage = 'starting',
                attempt_count = attempt_count + 1,
                started_at = NOW()
            WHERE id = (
                SELECT id FROM generation_jobs
                WHERE status = 'pending'
                ORDER BY created_at ASC
                FOR UPDATE SKIP LOCKED
                LIMIT 1
            )
            RETURNING *
            "#,
            vec![],
        );

        GenerationJobEntity::find()
            .from_raw_sql(stmt)
            .one(self.write_conn())
            .await
            .map_err(Into::into)
    }

    /// Write stage name and progress percent back to the job row
    pub async fn update_job_progress(
        &self,
        id: Uuid,
        stage: &str,
        progress_percent: i32,
    ) -> Result<()> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "UPDATE generation_jobs SET stage = $2, progress_percent = $3 WHERE id = $1",
            vec![id.into(), stage.into(), progress_percent.into()],
        );
        self.write_conn().execute(stmt).await?;
        Ok(())
    }

    /// Request cooperative cancellation. Pending jobs cancel immediately;
    /// running jobs move to `cancelling` and stop at the next stage boundary.
    pub async fn request_job_cancel(&self, id: Uuid) -> Result<GenerationJob> {
        let job = self
            .find_job_by_id(id)
            .await?
            .ok_or_else(|| AppError::JobNotFound { id: id.to_string() })?;

        let to = match job.job_status() {
            JobStatus::Pending => JobStatus::Cancelled,
            JobStatus::Running => JobStatus::Cancelling,
            other => {
                return Err(AppError::InvalidTransition {
                    from: String::from(other),
                    to: String::from(JobStatus::Cancelled),
                })
            }
        };

        let completed = matches!(to, JobStatus::Cancelled);
        let mut active: GenerationJobActiveModel = job.into();
        active.status = Set(String::from(to));
        if completed {
            active.completed_at = Set(Some(chrono::Utc::now().into()));
        }

        active.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Check whether cancellation has been requested for a running job
    pub async fn is_job_cancelling(&self, id: Uuid) -> Result<bool> {
        let job = self
            .find_job_by_id(id)
            .await?
            .ok_or_else(|| AppError::JobNotFound { id: id.to_string() })?;
        Ok(job.job_status() == JobStatus::Cancelling)
    }

    /// Mark a job as cancelled after the worker observed the request
    pub async fn mark_job_cancelled(&self, id: Uuid) -> Result<()> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "UPDATE generation_jobs SET status = 'cancelled', completed_at = NOW() WHERE id = $1",
            vec![id.into()],
        );
        self.write_conn().execute(stmt).await?;
        Ok(())
    }

    /// Mark a job completed, linking the produced article
    pub async fn complete_job(&self, id: Uuid, article_id: Uuid) -> Result<()> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            UPDATE generation_jobs
            SET status = 'completed', stage = 'done', progress_percent = 100,
                article_id = $2, completed_at = NOW()
            WHERE id = $1
            "#,
            vec![id.into(), article_id.into()],
        );
        self.write_conn().execute(stmt).await?;
        Ok(())
    }

    /// Mark a job failed with a human-readable error for the UI
    pub async fn fail_job(&self, id: Uuid, error_message: &str) -> Result<()> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            UPDATE generation_jobs
            SET status = 'failed', error_message = $2, completed_at = NOW()
            WHERE id = $1
            "#,
            vec![id.into(), error_message.into()],
        );
        self.write_conn().execute(stmt).await?;
        Ok(())
    }

    // ========================================================================
    // Reference Data
    // ========================================================================

    /// Contributor personas in insertion order (stable for tie-breaking)
    pub async fn list_contributors(&self) -> Result<Vec<Contributor>> {
        ContributorEntity::find()
            .order_by_asc(ContributorColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// The full monetization taxonomy in seed order
    pub async fn list_monetization_programs(&self) -> Result<Vec<MonetizationProgram>> {
        MonetizationProgramEntity::find()
            .order_by_asc(MonetizationProgramColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }
}
