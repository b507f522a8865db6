//! In-process storage backend

use crate::storage::traits::{ListingStore, PageRegistry, RunLog, StorageError, StorageResult};
use crate::storage::{CareerPage, JobListing, RunRecord, RunStatus};
use chrono::Utc;
use std::collections::HashSet;

/// Storage held entirely in memory
///
/// Used by tests and by dry runs, which seed it from the persistent store so
/// deduplication behaves exactly as a real run would.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    pages: Vec<CareerPage>,
    listings: Vec<JobListing>,
    ids: HashSet<String>,
    runs: Vec<RunRecord>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store preloaded with pages and listings
    pub fn seeded(pages: Vec<CareerPage>, listings: Vec<JobListing>) -> Self {
        let ids = listings.iter().map(|listing| listing.id.clone()).collect();
        Self {
            pages,
            listings,
            ids,
            runs: Vec::new(),
        }
    }

    /// Number of stored listings
    pub fn listing_count(&self) -> usize {
        self.listings.len()
    }
}

impl ListingStore for MemoryStorage {
    fn contains_listing(&self, id: &str) -> StorageResult<bool> {
        Ok(self.ids.contains(id))
    }

    fn append_listing(&mut self, listing: &JobListing) -> StorageResult<()> {
        if !self.ids.insert(listing.id.clone()) {
            return Err(StorageError::ConstraintViolation(format!(
                "listing '{}' already stored",
                listing.id
            )));
        }
        self.listings.push(listing.clone());
        Ok(())
    }

    fn list_listings(&self) -> StorageResult<Vec<JobListing>> {
        // Later insertions first among equal timestamps
        let mut listings: Vec<JobListing> = self.listings.iter().rev().cloned().collect();
        listings.sort_by(|a, b| b.scraped_at.cmp(&a.scraped_at));
        Ok(listings)
    }
}

impl PageRegistry for MemoryStorage {
    fn list_pages(&self) -> StorageResult<Vec<CareerPage>> {
        Ok(self.pages.clone())
    }

    fn get_page(&self, url: &str) -> StorageResult<Option<CareerPage>> {
        Ok(self.pages.iter().find(|page| page.url == url).cloned())
    }

    fn add_page(&mut self, page: &CareerPage) -> StorageResult<bool> {
        if self.pages.iter().any(|existing| existing.url == page.url) {
            return Ok(false);
        }
        self.pages.push(page.clone());
        Ok(true)
    }

    fn remove_page(&mut self, url: &str) -> StorageResult<bool> {
        let before = self.pages.len();
        self.pages.retain(|page| page.url != url);
        Ok(self.pages.len() < before)
    }
}

impl RunLog for MemoryStorage {
    fn start_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let id = self.runs.len() as i64 + 1;
        self.runs.push(RunRecord {
            id,
            started_at: Utc::now().to_rfc3339(),
            finished_at: None,
            config_hash: config_hash.to_string(),
            status: RunStatus::Running,
            pages_visited: 0,
            new_listings: 0,
        });
        Ok(id)
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        pages_visited: u32,
        new_listings: u32,
    ) -> StorageResult<()> {
        if let Some(run) = self.runs.iter_mut().find(|run| run.id == run_id) {
            run.status = status;
            run.finished_at = Some(Utc::now().to_rfc3339());
            run.pages_visited = pages_visited;
            run.new_listings = new_listings;
        }
        Ok(())
    }

    fn latest_run(&self) -> StorageResult<Option<RunRecord>> {
        Ok(self.runs.last().cloned())
    }
}
