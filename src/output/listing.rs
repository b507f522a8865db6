//! Plain-text listing report

use crate::storage::JobListing;

/// Formats listings one per block, in the order given
pub fn format_listings(listings: &[JobListing]) -> String {
    let mut out = String::new();

    for listing in listings {
        out.push_str(&format!(
            "{} | {} | {}\n",
            listing.company, listing.title, listing.location
        ));
        out.push_str(&format!("  {}\n", listing.url));
        out.push_str(&format!(
            "  scraped {} from {}\n",
            listing.scraped_at.format("%Y-%m-%d %H:%M UTC"),
            listing.source
        ));
    }

    out.push_str(&format!("{} listing(s)\n", listings.len()));
    out
}

/// Prints listings to stdout
pub fn print_listings(listings: &[JobListing]) {
    print!("{}", format_listings(listings));
}
