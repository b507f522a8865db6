use url::Url;

/// Schemes that never point at a job posting
const NON_NAVIGABLE_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Resolves an href found on a career page into an absolute job URL
///
/// # Resolution Rules
///
/// 1. `http://` or `https://` hrefs are returned unchanged
/// 2. `//host/path` takes the scheme of `base`
/// 3. `/path` is appended directly to the origin of `base`
/// 4. Anything else is joined onto the origin of `base` with a single `/`
///
/// Rule 4 ignores the path of `base`: `jobs/42` found on
/// `https://acme.com/careers/` resolves to `https://acme.com/jobs/42`, not
/// `https://acme.com/careers/jobs/42`.
///
/// # Returns
///
/// * `Some(String)` - The absolute job URL
/// * `None` - The href is empty, uses a non-navigable scheme, or `base` does
///   not parse as a URL with a host
///
/// # Examples
///
/// ```
/// use job_sieve::url::resolve;
///
/// let base = "https://acme.com/careers";
/// assert_eq!(resolve(base, "/jobs/42").as_deref(), Some("https://acme.com/jobs/42"));
/// assert_eq!(resolve(base, "jobs/42").as_deref(), Some("https://acme.com/jobs/42"));
/// assert_eq!(resolve(base, "https://other.com/x").as_deref(), Some("https://other.com/x"));
/// ```
pub fn resolve(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("http://") || lowered.starts_with("https://") {
        return Some(href.to_string());
    }

    if NON_NAVIGABLE_SCHEMES
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    let base = Url::parse(base).ok()?;
    if base.host_str().is_none() {
        return None;
    }

    if let Some(rest) = href.strip_prefix("//") {
        return Some(format!("{}://{}", base.scheme(), rest));
    }

    let origin = base.origin().ascii_serialization();
    if href.starts_with('/') {
        Some(format!("{}{}", origin, href))
    } else {
        Some(format!("{}/{}", origin, href))
    }
}
