//! Schedule trigger: periodically scrapes every registered page

use crate::config::ScheduleInterval;
use crate::crawler::Crawler;
use crate::output::generate_markdown_summary;
use crate::storage::Storage;
use crate::SieveError;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError};
use tokio::time::MissedTickBehavior;

/// Runs "scrape all registered pages" once per interval until cancelled
///
/// The first run happens one full period after start. A tick that lands
/// while another run holds the guard is skipped, and ticks missed during a
/// long run are dropped rather than replayed. When `summary_path` is set, the
/// markdown report is rewritten after every completed run.
pub async fn run_schedule<S: Storage>(
    crawler: Arc<Crawler<S>>,
    interval: ScheduleInterval,
    summary_path: Option<PathBuf>,
) {
    let period = interval.period();
    let cancel = crawler.cancellation_token();

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately
    ticker.tick().await;

    tracing::info!("Scheduled scrapes every {}", interval.as_str());

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        match crawler.scrape_registered().await {
            Ok(report) => {
                tracing::info!(
                    "Scheduled scrape found {} new listing(s)",
                    report.listings.len()
                );
                if let Some(path) = &summary_path {
                    let storage = crawler.storage();
                    let storage = storage.lock().unwrap_or_else(PoisonError::into_inner);
                    if let Err(e) = generate_markdown_summary(&*storage, path) {
                        tracing::warn!("Failed to write {}: {}", path.display(), e);
                    }
                }
            }
            Err(SieveError::ScrapeInProgress) => {
                tracing::warn!("Skipping scheduled scrape: a run is already in progress")
            }
            Err(e) => tracing::error!("Scheduled scrape failed: {}", e),
        }
    }

    tracing::info!("Scheduler stopped");
}
