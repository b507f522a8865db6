//! Crawler module: the page scraper, crawl loop and schedule trigger
//!
//! This module contains:
//! - Per-page scraping (fetch, cascade, field extraction, dedup, append)
//! - The sequential crawl loop with its politeness delay
//! - The scrape-in-progress guard and cancellation
//! - The periodic schedule trigger

mod coordinator;
mod politeness;
mod scheduler;
mod scraper;
#[cfg(test)]
mod stub;

pub use coordinator::{CrawlReport, Crawler};
pub use politeness::PolitenessDelay;
pub use scheduler::run_schedule;
pub use scraper::PageScraper;

use crate::config::Config;
use crate::render::build_fetcher;
use crate::storage::Storage;
use crate::SieveError;

/// Builds a crawler for `config` over the given storage backend
///
/// Pages declared in the configuration are seeded into the registry.
///
/// # Arguments
///
/// * `config` - The scraper configuration
/// * `config_hash` - Hash recorded on every run
/// * `storage` - Storage backend
pub fn build_crawler<S: Storage>(
    config: &Config,
    config_hash: &str,
    storage: S,
) -> Result<Crawler<S>, SieveError> {
    let fetcher = build_fetcher(config)?;
    let crawler = Crawler::new(fetcher, storage, &config.scraper, config_hash);
    crawler.sync_registry(&config.pages)?;
    Ok(crawler)
}
