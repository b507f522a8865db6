//! URL handling module for Job-Sieve
//!
//! This module resolves hrefs found on career pages into absolute job URLs
//! and validates the URLs that are allowed into the page registry.

mod resolve;

use crate::{UrlError, UrlResult};
use url::Url;

// Re-export main functions
pub use resolve::resolve;

/// Validates a career page URL before it enters the registry
///
/// The URL must parse, use HTTP or HTTPS, and carry a host.
///
/// # Examples
///
/// ```
/// use job_sieve::url::validate_page_url;
///
/// assert!(validate_page_url("https://acme.com/careers").is_ok());
/// assert!(validate_page_url("mailto:jobs@acme.com").is_err());
/// ```
pub fn validate_page_url(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}
