//! Storage traits and error types
//!
//! The crawler depends only on these traits; backends are injected.

use crate::storage::{CareerPage, JobListing, RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Append-only store of job listings keyed by identity
pub trait ListingStore {
    /// Returns true if a listing with this identity was already stored
    fn contains_listing(&self, id: &str) -> StorageResult<bool>;

    /// Stores a new listing
    ///
    /// Fails with [`StorageError::ConstraintViolation`] if the identity is
    /// already present; stored listings are never overwritten.
    fn append_listing(&mut self, listing: &JobListing) -> StorageResult<()>;

    /// All listings, newest first
    fn list_listings(&self) -> StorageResult<Vec<JobListing>>;
}

/// Ordered collection of career pages, keyed by URL
pub trait PageRegistry {
    /// All pages in registration order
    fn list_pages(&self) -> StorageResult<Vec<CareerPage>>;

    fn get_page(&self, url: &str) -> StorageResult<Option<CareerPage>>;

    /// Registers a page; returns false (and changes nothing) if the URL is
    /// already registered
    fn add_page(&mut self, page: &CareerPage) -> StorageResult<bool>;

    /// Unregisters a page; returns false if it was not registered
    ///
    /// Listings found on the page are kept.
    fn remove_page(&mut self, url: &str) -> StorageResult<bool>;
}

/// Record of crawl runs
pub trait RunLog {
    /// Opens a run in the `Running` state and returns its ID
    fn start_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Closes a run with its final status and counters
    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        pages_visited: u32,
        new_listings: u32,
    ) -> StorageResult<()>;

    fn latest_run(&self) -> StorageResult<Option<RunRecord>>;
}

/// Everything the crawler needs from a backend
pub trait Storage: ListingStore + PageRegistry + RunLog + Send {}

impl<T: ListingStore + PageRegistry + RunLog + Send> Storage for T {}
