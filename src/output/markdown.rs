//! Markdown listing report
//!
//! Listings are grouped by company (alphabetical), newest first within each
//! group.

use crate::output::OutputResult;
use crate::storage::{JobListing, Storage};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown report for everything in `storage` to `output_path`
///
/// Returns the number of listings written.
pub fn generate_markdown_summary(storage: &dyn Storage, output_path: &Path) -> OutputResult<usize> {
    let listings = storage.list_listings()?;
    let page_count = storage.list_pages()?.len();
    let markdown = format_markdown_summary(&listings, page_count, Utc::now());

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(listings.len())
}

/// Formats listings as a markdown report
///
/// # Arguments
///
/// * `listings` - Listings, newest first
/// * `page_count` - Number of registered career pages
/// * `generated_at` - Timestamp shown in the header
pub fn format_markdown_summary(
    listings: &[JobListing],
    page_count: usize,
    generated_at: DateTime<Utc>,
) -> String {
    let mut md = String::new();

    md.push_str("# Job Listings\n\n");
    md.push_str(&format!(
        "- **Generated**: {}\n",
        generated_at.format("%Y-%m-%d %H:%M UTC")
    ));
    md.push_str(&format!("- **Career Pages**: {}\n", page_count));
    md.push_str(&format!("- **Listings**: {}\n\n", listings.len()));

    if listings.is_empty() {
        md.push_str("_No listings found yet._\n");
        return md;
    }

    let mut by_company: BTreeMap<&str, Vec<&JobListing>> = BTreeMap::new();
    for listing in listings {
        by_company
            .entry(listing.company.as_str())
            .or_default()
            .push(listing);
    }

    for (company, group) in by_company {
        md.push_str(&format!("## {} ({})\n\n", escape(company), group.len()));
        md.push_str("| Title | Location | Scraped |\n");
        md.push_str("|-------|----------|---------|\n");
        for listing in group {
            md.push_str(&format!(
                "| [{}]({}) | {} | {} |\n",
                escape(&listing.title),
                listing.url,
                escape(&listing.location),
                listing.scraped_at.format("%Y-%m-%d")
            ));
        }
        md.push('\n');
    }

    md
}

/// Escapes characters that would break a table cell or link text
fn escape(text: &str) -> String {
    text.replace('|', "\\|")
        .replace('[', "\\[")
        .replace(']', "\\]")
}
