//! Perdia Generation Worker
//!
//! Polls the generation queue (a Postgres table) for pending jobs:
//! 1. Claims the oldest pending job with FOR UPDATE SKIP LOCKED
//! 2. Runs the idea through the generation pipeline
//! 3. Writes stage progress back to the job row
//! 4. Saves the article and marks the job terminal

mod errors;
mod processor;
mod runner;

use crate::processor::{GenerationPipeline, PipelineSettings};
use crate::runner::JobRunner;
use perdia_common::{
    config::AppConfig,
    contributors::default_contributors,
    db::{DbPool, Repository},
    metrics::register_metrics,
    monetize::ProgramRecord,
    providers::{create_fixer, create_generator, create_humanizer_chain},
    VERSION,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn, Level};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(true)
        .json()
        .init();

    info!("Starting Perdia Generation Worker v{}", VERSION);

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;
    let config = Arc::new(config);

    // Expose Prometheus metrics when a port is configured
    if config.observability.metrics_port > 0 {
        PrometheusBuilder::new()
            .with_http_listener(([0, 0, 0, 0], config.observability.metrics_port))
            .install()?;
        info!(port = config.observability.metrics_port, "Metrics exporter listening");
    }
    register_metrics();

    // Initialize database connection
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;
    let repository = Arc::new(Repository::new(db));

    // Initialize providers
    let generator = create_generator(&config.providers)?;
    let fixer = create_fixer(&config.providers)?;
    let humanizer = create_humanizer_chain(&config.providers)?;

    info!(
        generator = %generator.name(),
        fixer = %fixer.name(),
        "Providers initialized"
    );

    // Contributor personas and the monetization taxonomy are small and
    // change rarely; both are loaded once at startup
    let contributors = match repository.list_contributors().await {
        Ok(rows) if !rows.is_empty() => rows.iter().map(Into::into).collect(),
        Ok(_) => {
            info!("No contributors in database, using built-in personas");
            default_contributors()
        }
        Err(e) => {
            warn!(error = %e, "Failed to load contributors, using built-in personas");
            default_contributors()
        }
    };

    let programs: Vec<ProgramRecord> = repository
        .list_monetization_programs()
        .await
        .map(|rows| rows.iter().map(Into::into).collect())
        .unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load monetization programs, monetization disabled");
            Vec::new()
        });

    info!(
        contributors = contributors.len(),
        programs = programs.len(),
        "Reference data loaded"
    );

    let pipeline = GenerationPipeline::new(
        generator,
        fixer,
        humanizer,
        contributors,
        programs,
        PipelineSettings {
            stage_delay: config.stage_delay(),
            max_internal_links: config.pipeline.max_internal_links,
            shortcode_placements: config.pipeline.shortcode_placements,
        },
    );
    // Shared shutdown flag, observed at every pipeline stage boundary.
    // The in-flight job runs to a terminal state (cancelled at the next
    // boundary) instead of being dropped mid-stage with its row stuck in
    // `running`.
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received, finishing in-flight work");
                shutdown.store(true, Ordering::SeqCst);
            }
        });
    }

    let job_runner = JobRunner::new(repository, pipeline, Arc::clone(&shutdown));

    info!("Generation worker ready, starting queue polling...");

    let poll_interval = config.poll_interval();

    // Circuit breaker state
    let mut consecutive_failures = 0;
    const MAX_FAILURES: u32 = 5;
    const CIRCUIT_BREAK_DURATION: std::time::Duration = std::time::Duration::from_secs(30);

    // Start polling loop
    while !shutdown.load(Ordering::SeqCst) {
        // Circuit breaker check
        if consecutive_failures >= MAX_FAILURES {
            warn!(
                failures = consecutive_failures,
                "Circuit breaker open, pausing..."
            );
            tokio::time::sleep(CIRCUIT_BREAK_DURATION).await;
            consecutive_failures = 0;
            info!("Circuit breaker reset, resuming...");
            continue;
        }

        match job_runner.run_next().await {
            Ok(true) => {
                consecutive_failures = 0;
            }
            Ok(false) => {
                // Queue empty
                tokio::time::sleep(poll_interval).await;
            }
            Err(e) => {
                consecutive_failures += 1;
                error!(
                    error = %e,
                    failures = consecutive_failures,
                    "Job processing failed"
                );
                tokio::time::sleep(poll_interval).await;
            }
        }
    }

    info!("Generation worker shutting down");
    Ok(())
}
