//! Statistics over the listing store
//!
//! This module provides functionality for extracting and displaying
//! listing statistics from the storage layer.

use crate::output::OutputResult;
use crate::storage::{RunRecord, Storage};
use std::collections::HashMap;

/// Listing store statistics summary
#[derive(Debug, Clone)]
pub struct ListingStatistics {
    /// Total number of stored listings
    pub total_listings: u64,

    /// Number of registered career pages
    pub total_pages: u64,

    /// Listing count per company, largest first
    pub per_company: Vec<(String, u64)>,

    /// Most recent crawl run, if any
    pub latest_run: Option<RunRecord>,
}

/// Loads statistics from storage
pub fn load_statistics(storage: &dyn Storage) -> OutputResult<ListingStatistics> {
    let listings = storage.list_listings()?;
    let total_pages = storage.list_pages()?.len() as u64;

    let mut counts: HashMap<&str, u64> = HashMap::new();
    for listing in &listings {
        *counts.entry(listing.company.as_str()).or_insert(0) += 1;
    }

    let mut per_company: Vec<(String, u64)> = counts
        .into_iter()
        .map(|(company, count)| (company.to_string(), count))
        .collect();
    per_company.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    Ok(ListingStatistics {
        total_listings: listings.len() as u64,
        total_pages,
        per_company,
        latest_run: storage.latest_run()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &ListingStatistics) {
    println!("=== Job Listing Statistics ===\n");

    println!("Overview:");
    println!("  Registered career pages: {}", stats.total_pages);
    println!("  Stored listings: {}", stats.total_listings);
    println!();

    if !stats.per_company.is_empty() {
        println!("Listings by Company:");
        for (company, count) in &stats.per_company {
            let percentage = (*count as f64 / stats.total_listings as f64) * 100.0;
            println!("  {}: {} ({:.1}%)", company, count, percentage);
        }
        println!();
    }

    match &stats.latest_run {
        Some(run) => {
            println!("Latest Run (#{}):", run.id);
            println!("  Status: {}", run.status.to_db_string());
            println!("  Started: {}", run.started_at);
            if let Some(finished) = &run.finished_at {
                println!("  Finished: {}", finished);
            }
            println!("  Pages visited: {}", run.pages_visited);
            println!("  New listings: {}", run.new_listings);
            println!("  Config hash: {}", run.config_hash);
        }
        None => println!("No crawl runs recorded yet."),
    }
}
