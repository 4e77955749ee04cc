//! Job runner: binds the pipeline to the database-backed queue
//!
//! Claims jobs, loads the idea and link candidates, wires progress and
//! cancellation to the job row, and persists the result.

use crate::errors::PipelineError;
use crate::processor::{GeneratedArticle, GenerationPipeline, IdeaInput, PipelineControl, Stage};
use async_trait::async_trait;
use perdia_common::content::links::LinkCandidate;
use perdia_common::db::models::{GenerationJob, IdeaStatus};
use perdia_common::db::Repository;
use perdia_common::metrics::record_job;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Published articles considered as internal-link targets per run
const LINK_CANDIDATE_LIMIT: u64 = 50;

/// Writes progress to the job row and polls for cancellation at every
/// stage boundary. Worker shutdown is observed here too, so an in-flight
/// job ends in a terminal state instead of staying `running` forever.
struct JobControl {
    repository: Arc<Repository>,
    job_id: Uuid,
    shutdown: Arc<AtomicBool>,
}

#[async_trait]
impl PipelineControl for JobControl {
    async fn stage_boundary(&self, stage: Stage) -> Result<(), PipelineError> {
        if self.shutdown.load(Ordering::SeqCst) {
            return Err(PipelineError::Cancelled(stage.name().into()));
        }

        if self.repository.is_job_cancelling(self.job_id).await? {
            return Err(PipelineError::Cancelled(stage.name().into()));
        }

        self.repository
            .update_job_progress(self.job_id, stage.name(), stage.progress_percent())
            .await?;

        Ok(())
    }
}

pub struct JobRunner {
    repository: Arc<Repository>,
    pipeline: GenerationPipeline,
    shutdown: Arc<AtomicBool>,
}

impl JobRunner {
    pub fn new(
        repository: Arc<Repository>,
        pipeline: GenerationPipeline,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            repository,
            pipeline,
            shutdown,
        }
    }

    /// Claim the oldest pending job, if any, and run it to a terminal
    /// status. Returns whether a job was claimed.
    pub async fn run_next(&self) -> Result<bool, PipelineError> {
        let Some(job) = self.repository.claim_next_job().await? else {
            return Ok(false);
        };

        info!(job_id = %job.id, idea_id = %job.idea_id, "Claimed generation job");

        match self.run_claimed(&job).await {
            Ok(article) => {
                record_job(
                    "completed",
                    Some(article.quality_score),
                    article.fix_attempts,
                );
                Ok(true)
            }
            Err(e) if e.is_cancellation() => {
                info!(job_id = %job.id, "Job cancelled at stage boundary");
                self.repository.mark_job_cancelled(job.id).await?;
                record_job("cancelled", None, 0);
                Ok(true)
            }
            Err(e) => {
                error!(job_id = %job.id, error = %e, "Generation job failed");
                if let Err(mark_err) = self.repository.fail_job(job.id, &e.to_string()).await {
                    error!(job_id = %job.id, error = %mark_err, "Failed to mark job failed");
                }
                record_job("failed", None, 0);
                Err(e)
            }
        }
    }

    #[instrument(skip_all, fields(job_id = %job.id))]
    async fn run_claimed(&self, job: &GenerationJob) -> Result<GeneratedArticle, PipelineError> {
        let idea = self
            .repository
            .find_idea_by_id(job.idea_id)
            .await?
            .ok_or(PipelineError::IdeaNotFound(job.idea_id))?;

        if !idea.is_generatable() {
            return Err(PipelineError::IdeaNotGeneratable {
                id: idea.id,
                status: idea.status.clone(),
            });
        }

        let input = IdeaInput {
            id: idea.id,
            title: idea.title.clone(),
            topics: idea.topic_list(),
            content_type: idea.content_type.clone(),
        };

        // Link candidates are best-effort; a read failure only costs links
        let candidates = match self.repository.list_link_candidates(LINK_CANDIDATE_LIMIT).await {
            Ok(pairs) => pairs
                .into_iter()
                .map(|(title, slug)| LinkCandidate { title, slug })
                .collect(),
            Err(e) => {
                warn!(error = %e, "Failed to load link candidates, continuing without");
                Vec::new()
            }
        };

        let options = job.job_options();
        let control = JobControl {
            repository: Arc::clone(&self.repository),
            job_id: job.id,
            shutdown: Arc::clone(&self.shutdown),
        };

        let article = self
            .pipeline
            .generate(&input, &candidates, &options, &control)
            .await?;

        let saved = self
            .repository
            .create_article(
                Some(idea.id),
                article.title.clone(),
                article.slug.clone(),
                article.html.clone(),
                article.excerpt.clone(),
                article.contributor_key.clone(),
                article.word_count,
                article.quality_score,
                article.risk_flags.clone(),
                article.internal_link_count,
                article.external_link_count,
                article.monetization_program_id,
            )
            .await?;

        if let Err(e) = self
            .repository
            .transition_idea(idea.id, IdeaStatus::Completed)
            .await
        {
            warn!(idea_id = %idea.id, error = %e, "Failed to mark idea completed");
        }

        self.repository.complete_job(job.id, saved.id).await?;

        info!(
            job_id = %job.id,
            article_id = %saved.id,
            score = article.quality_score,
            words = article.word_count,
            "Generation job completed"
        );

        Ok(article)
    }
}
