//! Generation pipeline orchestrator
//!
//! Runs a claimed job through the fixed stage sequence: contributor
//! assignment, drafting, humanization, internal linking, monetization,
//! quality scoring with the bounded auto-fix loop, and save. Stage
//! boundaries report progress and observe cancellation through
//! [`PipelineControl`], so the orchestration itself stays testable
//! without a database.

use crate::errors::PipelineError;
use async_trait::async_trait;
use perdia_common::content::links::{insert_internal_links, LinkCandidate};
use perdia_common::content::quality::{assess, ContentStats};
use perdia_common::content::validator::validate;
use perdia_common::content::slug::slugify;
use perdia_common::content::strip_tags;
use perdia_common::contributors::{assign, ContributorProfile};
use perdia_common::db::models::JobOptions;
use perdia_common::monetize::{insert_shortcode, match_program, shortcode, ProgramRecord};
use perdia_common::providers::{DraftRequest, HumanizerChain, TextGenerator};
use perdia_common::metrics::{record_provider, record_stage};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Rough token budget per requested word of output
const TOKENS_PER_WORD: u32 = 4;

/// Maximum characters of plain text kept as the article excerpt
const EXCERPT_CHARS: usize = 200;

/// The fixed stage sequence. Progress percentages are milestones the
/// dashboard renders, not measured work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    AssignContributor,
    Draft,
    Humanize,
    InternalLinks,
    Monetize,
    QualityCheck,
    Save,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::AssignContributor => "assign_contributor",
            Stage::Draft => "draft",
            Stage::Humanize => "humanize",
            Stage::InternalLinks => "internal_links",
            Stage::Monetize => "monetize",
            Stage::QualityCheck => "quality_check",
            Stage::Save => "save",
        }
    }

    pub fn progress_percent(&self) -> i32 {
        match self {
            Stage::AssignContributor => 5,
            Stage::Draft => 25,
            Stage::Humanize => 55,
            Stage::InternalLinks => 65,
            Stage::Monetize => 75,
            Stage::QualityCheck => 85,
            Stage::Save => 100,
        }
    }
}

/// Stage-boundary hook: reports progress and surfaces cancellation.
/// The worker binds this to the job row; tests use [`NoopControl`].
#[async_trait]
pub trait PipelineControl: Send + Sync {
    /// Called when a stage is about to start. Returning
    /// `Err(PipelineError::Cancelled)` stops the run at this boundary.
    async fn stage_boundary(&self, stage: Stage) -> Result<(), PipelineError>;
}

/// Control that never cancels and reports nowhere
pub struct NoopControl;

#[async_trait]
impl PipelineControl for NoopControl {
    async fn stage_boundary(&self, _stage: Stage) -> Result<(), PipelineError> {
        Ok(())
    }
}

/// The idea fields the pipeline needs, decoupled from the entity
#[derive(Debug, Clone)]
pub struct IdeaInput {
    pub id: Uuid,
    pub title: String,
    pub topics: Vec<String>,
    pub content_type: String,
}

/// Everything the worker persists after a successful run
#[derive(Debug, Clone)]
pub struct GeneratedArticle {
    pub title: String,
    pub slug: String,
    pub html: String,
    pub excerpt: Option<String>,
    pub contributor_key: String,
    pub word_count: i32,
    pub quality_score: i32,
    pub risk_flags: Vec<String>,
    pub internal_link_count: i32,
    pub external_link_count: i32,
    pub monetization_program_id: Option<Uuid>,
    pub fix_attempts: u32,
}

/// Pacing and limits applied to every run
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Fixed pause inserted between stages
    pub stage_delay: Duration,
    pub max_internal_links: usize,
    /// CTA shortcode placements per article (1 or 2)
    pub shortcode_placements: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            stage_delay: Duration::from_millis(500),
            max_internal_links: 5,
            shortcode_placements: 1,
        }
    }
}

pub struct GenerationPipeline {
    generator: Arc<dyn TextGenerator>,
    fixer: Arc<dyn TextGenerator>,
    humanizer: HumanizerChain,
    contributors: Vec<ContributorProfile>,
    programs: Vec<ProgramRecord>,
    settings: PipelineSettings,
}

impl GenerationPipeline {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        fixer: Arc<dyn TextGenerator>,
        humanizer: HumanizerChain,
        contributors: Vec<ContributorProfile>,
        programs: Vec<ProgramRecord>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            generator,
            fixer,
            humanizer,
            contributors,
            programs,
            settings,
        }
    }

    /// Run the full pipeline for one idea. `candidates` are published
    /// articles available as internal-link targets.
    #[instrument(skip_all, fields(idea_id = %idea.id, title = %idea.title))]
    pub async fn generate(
        &self,
        idea: &IdeaInput,
        candidates: &[LinkCandidate],
        options: &JobOptions,
        control: &dyn PipelineControl,
    ) -> Result<GeneratedArticle, PipelineError> {
        let mut risk_flags: Vec<String> = Vec::new();

        // Stage 1: contributor assignment
        control.stage_boundary(Stage::AssignContributor).await?;
        let contributor = assign(
            &self.contributors,
            &idea.title,
            &idea.topics,
            &idea.content_type,
        )
        .ok_or_else(|| PipelineError::ConfigError("no contributor personas configured".into()))?;
        info!(contributor = %contributor.key, "Assigned contributor persona");
        self.pace().await;

        // Stage 2: draft, validate, one regeneration retry
        control.stage_boundary(Stage::Draft).await?;
        let mut html = self.draft_with_retry(idea, contributor, options).await?;
        self.pace().await;

        // Stage 3: humanize through the fallback chain
        control.stage_boundary(Stage::Humanize).await?;
        let start = Instant::now();
        html = match self.humanizer.humanize(&html).await {
            Ok(rewritten) => {
                record_stage(Stage::Humanize.name(), start.elapsed().as_secs_f64(), true);
                rewritten
            }
            Err(e) => {
                record_stage(Stage::Humanize.name(), start.elapsed().as_secs_f64(), false);
                return Err(PipelineError::HumanizeFailed(e.to_string()));
            }
        };
        self.pace().await;

        // Stage 4: internal links (non-blocking)
        control.stage_boundary(Stage::InternalLinks).await?;
        let (linked, inserted) =
            insert_internal_links(&html, candidates, self.settings.max_internal_links);
        if inserted > 0 {
            info!(inserted, "Inserted internal links");
            html = linked;
        }
        self.pace().await;

        // Stage 5: monetization (non-blocking)
        control.stage_boundary(Stage::Monetize).await?;
        let monetization_program_id = self.monetize(idea, &mut html);
        self.pace().await;

        // Stage 6: quality scoring and bounded auto-fix
        control.stage_boundary(Stage::QualityCheck).await?;
        let (final_html, report, fix_attempts) = self
            .quality_loop(html, options.max_fix_attempts, &mut risk_flags)
            .await;
        html = final_html;
        risk_flags.extend(report.flags());
        self.pace().await;

        // Stage 7: assemble for save
        control.stage_boundary(Stage::Save).await?;
        let stats = ContentStats::from_html(&html);
        let text = strip_tags(&html);

        Ok(GeneratedArticle {
            title: idea.title.clone(),
            slug: slugify(&idea.title),
            html,
            excerpt: make_excerpt(&text),
            contributor_key: contributor.key.clone(),
            word_count: stats.word_count as i32,
            quality_score: report.score,
            risk_flags,
            internal_link_count: stats.internal_links as i32,
            external_link_count: stats.external_links as i32,
            monetization_program_id,
            fix_attempts,
        })
    }

    /// Draft once; on validation failure regenerate once with a raised
    /// token budget, then give up.
    async fn draft_with_retry(
        &self,
        idea: &IdeaInput,
        contributor: &ContributorProfile,
        options: &JobOptions,
    ) -> Result<String, PipelineError> {
        let base_tokens = options.target_word_count as u32 * TOKENS_PER_WORD;
        let mut request = DraftRequest {
            title: idea.title.clone(),
            topics: idea.topics.clone(),
            content_type: idea.content_type.clone(),
            contributor_voice: contributor.voice.clone(),
            target_word_count: options.target_word_count,
            max_tokens: base_tokens,
        };

        let start = Instant::now();
        let html = self.generator.draft(&request).await.map_err(|e| {
            record_provider(self.generator.name(), false);
            PipelineError::ProviderError {
                stage: Stage::Draft.name().into(),
                message: e.to_string(),
            }
        })?;
        record_provider(self.generator.name(), true);

        let issues = validate(&html);
        if issues.is_empty() {
            record_stage(Stage::Draft.name(), start.elapsed().as_secs_f64(), true);
            return Ok(html);
        }

        warn!(
            issues = issues.len(),
            first = %issues[0].detail,
            "Draft failed validation, regenerating with raised token budget"
        );

        // The common truncation cause is an exhausted budget
        request.max_tokens = base_tokens + base_tokens / 2;

        let html = self.generator.draft(&request).await.map_err(|e| {
            record_provider(self.generator.name(), false);
            PipelineError::ProviderError {
                stage: Stage::Draft.name().into(),
                message: e.to_string(),
            }
        })?;
        record_provider(self.generator.name(), true);

        let issues = validate(&html);
        if issues.is_empty() {
            record_stage(Stage::Draft.name(), start.elapsed().as_secs_f64(), true);
            Ok(html)
        } else {
            record_stage(Stage::Draft.name(), start.elapsed().as_secs_f64(), false);
            let detail = issues
                .iter()
                .map(|i| i.detail.clone())
                .collect::<Vec<_>>()
                .join("; ");
            Err(PipelineError::DraftRejected(detail))
        }
    }

    /// Match the idea against the program taxonomy and insert the CTA
    /// shortcode. Never fails the run.
    fn monetize(&self, idea: &IdeaInput, html: &mut String) -> Option<Uuid> {
        let topic_text = format!(
            "{} {} {}",
            idea.title,
            idea.topics.join(" "),
            idea.content_type
        );

        match match_program(&topic_text, &self.programs) {
            Some((record, score)) => {
                info!(program = %record.shortcode_id, score, "Matched monetization program");
                *html = insert_shortcode(html, &shortcode(record), self.settings.shortcode_placements);
                record.id
            }
            None => {
                info!("No monetization program matched");
                None
            }
        }
    }

    /// Score the article, then run the auto-fix loop until the score is
    /// clean, the attempt budget is spent, or an iteration stops
    /// improving the score.
    async fn quality_loop(
        &self,
        html: String,
        max_fix_attempts: u32,
        risk_flags: &mut Vec<String>,
    ) -> (String, perdia_common::content::quality::QualityReport, u32) {
        let mut current = html;
        let mut report = assess(&current);
        let mut attempts = 0;

        while report.has_issues() && attempts < max_fix_attempts {
            attempts += 1;
            info!(
                attempt = attempts,
                score = report.score,
                issues = report.issues.len(),
                "Running auto-fix"
            );

            let fixed = match self.fixer.fix(&current, &report.issue_messages()).await {
                Ok(fixed) => {
                    record_provider(self.fixer.name(), true);
                    fixed
                }
                Err(e) => {
                    record_provider(self.fixer.name(), false);
                    warn!(error = %e, "Auto-fix call failed, keeping current draft");
                    risk_flags.push("autofix_failed".into());
                    break;
                }
            };

            // A fix that reintroduces validation problems is discarded
            if !validate(&fixed).is_empty() {
                warn!("Auto-fix output failed validation, keeping current draft");
                risk_flags.push("autofix_rejected".into());
                break;
            }

            let fixed_report = assess(&fixed);
            if fixed_report.score <= report.score {
                info!(
                    old_score = report.score,
                    new_score = fixed_report.score,
                    "Auto-fix stopped improving, keeping current draft"
                );
                break;
            }

            current = fixed;
            report = fixed_report;
        }

        (current, report, attempts)
    }

    async fn pace(&self) {
        if !self.settings.stage_delay.is_zero() {
            tokio::time::sleep(self.settings.stage_delay).await;
        }
    }
}

/// First EXCERPT_CHARS characters of plain text, cut on a char boundary
fn make_excerpt(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.chars().count() <= EXCERPT_CHARS {
        return Some(trimmed.to_string());
    }

    let cut: String = trimmed.chars().take(EXCERPT_CHARS).collect();
    // Trim back to the last whole word
    let cut = match cut.rfind(' ') {
        Some(pos) => &cut[..pos],
        None => &cut,
    };
    Some(format!("{}...", cut))
}

#[cfg(test)]
mod tests {
    use super::*;
    use perdia_common::errors::AppError;
    use perdia_common::providers::{MockGenerator, MockHumanizer};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// A draft long and well-formed enough to pass the validator
    fn valid_draft() -> String {
        let mut html = String::from("<h2>Overview</h2>");
        for i in 0..6 {
            html.push_str(&format!(
                "<p>Paragraph number {} covers the practical details that students \
                 ask about most often when comparing accredited degree options.</p>",
                i
            ));
        }
        html.push_str("<h2>Costs</h2><p>Tuition varies widely between institutions.</p>");
        html.push_str("<h2>FAQ</h2>");
        html.push_str("<h3>Is it worth it?</h3><p>For most applicants, yes.</p>");
        html.push_str("<h3>How long does it take?</h3><p>Typically two years.</p>");
        html.push_str("<h3>Can I study part time?</h3><p>Most programs allow it.</p>");
        html
    }

    fn truncated_draft() -> String {
        // No closing tag at the end, trips the truncation check
        format!("{}<p>And one more thing", valid_draft())
    }

    fn pipeline_with(
        generator: Arc<dyn TextGenerator>,
        fixer: Arc<dyn TextGenerator>,
        humanizer: HumanizerChain,
    ) -> GenerationPipeline {
        GenerationPipeline::new(
            generator,
            fixer,
            humanizer,
            perdia_common::contributors::default_contributors(),
            Vec::new(),
            PipelineSettings {
                stage_delay: Duration::ZERO,
                ..PipelineSettings::default()
            },
        )
    }

    fn idea() -> IdeaInput {
        IdeaInput {
            id: Uuid::new_v4(),
            title: "Is an Online MBA Worth It".into(),
            topics: vec!["mba".into(), "business".into()],
            content_type: "guide".into(),
        }
    }

    fn passthrough_chain() -> HumanizerChain {
        HumanizerChain::new(vec![Arc::new(MockHumanizer::passthrough())])
    }

    /// Generator that replays a scripted sequence of responses
    struct SequenceGenerator {
        responses: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl SequenceGenerator {
        fn new(responses: Vec<String>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for SequenceGenerator {
        async fn draft(&self, _request: &DraftRequest) -> perdia_common::errors::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(AppError::Provider {
                    provider: "sequence".into(),
                    message: "script exhausted".into(),
                });
            }
            Ok(responses.remove(0))
        }

        async fn fix(&self, html: &str, _issues: &[String]) -> perdia_common::errors::Result<String> {
            Ok(html.to_string())
        }

        fn name(&self) -> &str {
            "sequence"
        }
    }

    /// Control that cancels once a target stage is reached
    struct CancelAt {
        stage: Stage,
        seen: Mutex<Vec<Stage>>,
    }

    #[async_trait]
    impl PipelineControl for CancelAt {
        async fn stage_boundary(&self, stage: Stage) -> Result<(), PipelineError> {
            self.seen.lock().unwrap().push(stage);
            if stage == self.stage {
                Err(PipelineError::Cancelled(stage.name().into()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_happy_path_produces_article() {
        let pipeline = pipeline_with(
            Arc::new(MockGenerator::returning(valid_draft())),
            Arc::new(MockGenerator::returning(String::new())),
            passthrough_chain(),
        );

        let article = pipeline
            .generate(&idea(), &[], &JobOptions::default(), &NoopControl)
            .await
            .unwrap();

        assert_eq!(article.slug, "is-an-online-mba-worth-it");
        assert_eq!(article.contributor_key, "james-okafor");
        assert!(article.excerpt.is_some());
        assert!(article.word_count > 0);
        // Short test draft: the score reflects real penalties
        assert!(article.quality_score < 100);
        assert!(!article.risk_flags.is_empty());
    }

    #[tokio::test]
    async fn test_draft_retries_once_then_rejects() {
        let generator = Arc::new(SequenceGenerator::new(vec![
            truncated_draft(),
            truncated_draft(),
        ]));
        let calls = Arc::clone(&generator);
        let pipeline = pipeline_with(
            generator,
            Arc::new(MockGenerator::returning(String::new())),
            passthrough_chain(),
        );

        let err = pipeline
            .generate(&idea(), &[], &JobOptions::default(), &NoopControl)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::DraftRejected(_)));
        assert_eq!(calls.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_draft_retry_recovers() {
        let generator = Arc::new(SequenceGenerator::new(vec![
            truncated_draft(),
            valid_draft(),
        ]));
        let pipeline = pipeline_with(
            generator,
            Arc::new(MockGenerator::returning(String::new())),
            passthrough_chain(),
        );

        let article = pipeline
            .generate(&idea(), &[], &JobOptions::default(), &NoopControl)
            .await
            .unwrap();
        assert!(!article.html.is_empty());
    }

    #[tokio::test]
    async fn test_humanizer_chain_failure_fails_job() {
        let chain = HumanizerChain::new(vec![
            Arc::new(MockHumanizer::failing()),
            Arc::new(MockHumanizer::failing()),
        ]);
        let pipeline = pipeline_with(
            Arc::new(MockGenerator::returning(valid_draft())),
            Arc::new(MockGenerator::returning(String::new())),
            chain,
        );

        let err = pipeline
            .generate(&idea(), &[], &JobOptions::default(), &NoopControl)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::HumanizeFailed(_)));
    }

    #[tokio::test]
    async fn test_cancellation_stops_at_boundary() {
        let pipeline = pipeline_with(
            Arc::new(MockGenerator::returning(valid_draft())),
            Arc::new(MockGenerator::returning(String::new())),
            passthrough_chain(),
        );
        let control = CancelAt {
            stage: Stage::Humanize,
            seen: Mutex::new(Vec::new()),
        };

        let err = pipeline
            .generate(&idea(), &[], &JobOptions::default(), &control)
            .await
            .unwrap_err();

        assert!(err.is_cancellation());
        let seen = control.seen.lock().unwrap();
        // Earlier stages ran, later ones never started
        assert_eq!(
            *seen,
            vec![Stage::AssignContributor, Stage::Draft, Stage::Humanize]
        );
    }

    /// A shutdown flag flipped mid-run surfaces as cancellation at the
    /// next stage boundary, so the run still ends in a terminal state.
    #[tokio::test]
    async fn test_shutdown_flag_cancels_at_next_boundary() {
        struct FlagControl {
            flag: std::sync::atomic::AtomicBool,
        }

        #[async_trait]
        impl PipelineControl for FlagControl {
            async fn stage_boundary(&self, stage: Stage) -> Result<(), PipelineError> {
                if self.flag.load(Ordering::SeqCst) {
                    return Err(PipelineError::Cancelled(stage.name().into()));
                }
                if stage == Stage::Draft {
                    // Shutdown arrives while drafting is underway
                    self.flag.store(true, Ordering::SeqCst);
                }
                Ok(())
            }
        }

        let pipeline = pipeline_with(
            Arc::new(MockGenerator::returning(valid_draft())),
            Arc::new(MockGenerator::returning(String::new())),
            passthrough_chain(),
        );
        let control = FlagControl {
            flag: std::sync::atomic::AtomicBool::new(false),
        };

        let err = pipeline
            .generate(&idea(), &[], &JobOptions::default(), &control)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Cancelled(ref s) if s == Stage::Humanize.name()));
    }

    #[tokio::test]
    async fn test_autofix_failure_is_non_fatal() {
        let pipeline = pipeline_with(
            Arc::new(MockGenerator::returning(valid_draft())),
            Arc::new(MockGenerator::failing()),
            passthrough_chain(),
        );

        let article = pipeline
            .generate(&idea(), &[], &JobOptions::default(), &NoopControl)
            .await
            .unwrap();

        assert!(article.risk_flags.iter().any(|f| f == "autofix_failed"));
    }

    #[tokio::test]
    async fn test_autofix_stops_without_improvement() {
        // Fixer echoes the input, so the score never moves; the loop
        // must terminate after the first no-improvement iteration.
        let pipeline = pipeline_with(
            Arc::new(MockGenerator::returning(valid_draft())),
            Arc::new(MockGenerator::returning(String::new())),
            passthrough_chain(),
        );

        let article = pipeline
            .generate(&idea(), &[], &JobOptions::default(), &NoopControl)
            .await
            .unwrap();

        assert_eq!(article.fix_attempts, 1);
    }

    #[test]
    fn test_stage_progress_is_monotonic() {
        let stages = [
            Stage::AssignContributor,
            Stage::Draft,
            Stage::Humanize,
            Stage::InternalLinks,
            Stage::Monetize,
            Stage::QualityCheck,
            Stage::Save,
        ];
        for pair in stages.windows(2) {
            assert!(pair[0].progress_percent() < pair[1].progress_percent());
        }
    }

    #[test]
    fn test_excerpt_cuts_on_word_boundary() {
        let text = "word ".repeat(100);
        let excerpt = make_excerpt(&text).unwrap();
        assert!(excerpt.chars().count() <= EXCERPT_CHARS + 3);
        assert!(excerpt.ends_with("..."));
        assert!(!excerpt.contains("wor..."));
    }
}
