/// Derives the stable identity of a listing
///
/// Joins company, title and location with `-`, replaces every whitespace run
/// (including leading and trailing ones) with a single `-`, and lowercases the
/// result. Callers pass the location after defaulting, so a listing with no
/// location still has one identity.
///
/// # Example
///
/// ```
/// use job_sieve::identify;
///
/// assert_eq!(
///     identify("Acme", "Backend Engineer", "Remote/Unspecified"),
///     "acme-backend-engineer-remote/unspecified"
/// );
/// ```
pub fn identify(company: &str, title: &str, location: &str) -> String {
    let joined = format!("{}-{}-{}", company, title, location);
    let mut id = String::with_capacity(joined.len());
    let mut in_whitespace = false;

    for c in joined.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                id.push('-');
            }
            in_whitespace = true;
        } else {
            id.extend(c.to_lowercase());
            in_whitespace = false;
        }
    }

    id
}
