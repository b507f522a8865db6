//! Storage for the page registry, the listing store and the run log
//!
//! Two backends implement the same traits:
//! - [`SqliteStorage`] persists everything to a single SQLite file
//! - [`MemoryStorage`] keeps everything in process, for tests and dry runs

mod memory;
mod schema;
mod sqlite;
mod traits;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;
pub use traits::{ListingStore, PageRegistry, RunLog, Storage, StorageError, StorageResult};

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Opens (creating if needed) the SQLite database at `path`
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// Current time at the precision `scraped_at` is stored with
///
/// The SQLite backend keeps microseconds, so a listing stamped here reads back
/// identical to the value that was written.
pub fn listing_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// A registered employer career page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerPage {
    /// Natural key
    pub url: String,
    /// Display name, stored as the listing's company
    pub name: String,
}

impl CareerPage {
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
        }
    }
}

/// A job posting, written once and never modified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobListing {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: String,
    /// URL of the career page the listing was found on
    pub source: String,
    pub scraped_at: DateTime<Utc>,
}

/// Represents a crawl run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub pages_visited: u32,
    pub new_listings: u32,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    /// Stopped by the cancellation token before visiting every page
    Cancelled,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}
