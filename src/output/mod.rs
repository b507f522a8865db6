//! Output module for listing reports and statistics
//!
//! This module handles:
//! - Printing stored listings to stdout
//! - Exporting a markdown report grouped by company
//! - Computing and printing store statistics

mod listing;
mod markdown;
pub mod stats;

pub use listing::{format_listings, print_listings};
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{load_statistics, print_statistics, ListingStatistics};

use crate::storage::StorageError;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
