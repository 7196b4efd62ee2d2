//! Storyhaven Purge Worker
//!
//! Periodically scans the trash and permanently deletes stories whose
//! retention window has elapsed:
//! 1. Finds trashed stories with purge_at in the past
//! 2. Deletes each one (comments, bookmarks and view history go with it)
//! 3. Records metrics for each sweep

use std::sync::Arc;
use storyhaven_common::{
    config::AppConfig,
    db::{DbPool, Repository},
    metrics, LifecycleController, VERSION,
};
use tracing::{error, info, Level};

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

    info!("Starting Storyhaven Purge Worker v{}", VERSION);

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        e
    })?;

    let config = Arc::new(config);

    metrics::register_metrics();
    if config.observability.metrics_port > 0 {
        let metrics_addr =
            std::net::SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(metrics_addr)
            .install()?;
        info!("Metrics exposed on {}", metrics_addr);
    }

    // Initialize database connection
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;

    let repo = Repository::new(db);
    let lifecycle = LifecycleController::new(repo.clone(), &config.content);

    // "once" runs a single sweep and exits, for cron-style deployment
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "once" {
        let purged = run_sweep(&repo, &lifecycle).await?;
        info!(purged = purged, "Single sweep complete");
        return Ok(());
    }

    let interval = config.purge_scan_interval();
    info!(interval_secs = interval.as_secs(), "Purge worker ready");

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match run_sweep(&repo, &lifecycle).await {
                    Ok(0) => {}
                    Ok(purged) => info!(purged = purged, "Purge sweep complete"),
                    Err(e) => error!(error = %e, "Purge sweep failed"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
                break;
            }
        }
    }

    info!("Purge worker shutdown complete");
    Ok(())
}

/// Delete every trashed story whose purge deadline has passed.
///
/// Failures on individual stories are logged and skipped so one bad row
/// cannot stall the rest of the sweep.
async fn run_sweep(
    repo: &Repository,
    lifecycle: &LifecycleController,
) -> Result<usize, storyhaven_common::AppError> {
    let now = chrono::Utc::now();
    let expired = repo.find_purgeable(now).await?;

    if expired.is_empty() {
        return Ok(0);
    }

    info!(count = expired.len(), "Found expired trashed stories");

    let mut purged = 0;
    for story in expired {
        match lifecycle.permanently_delete(story.id).await {
            Ok(()) => {
                info!(
                    story_id = %story.id,
                    author_id = %story.author_id,
                    trashed_at = ?story.deleted_at,
                    "Story purged"
                );
                purged += 1;
            }
            Err(e) => {
                error!(story_id = %story.id, error = %e, "Failed to purge story");
            }
        }
    }

    Ok(purged)
}
