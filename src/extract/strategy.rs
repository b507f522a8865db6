//! Ordered strategy tables for the selector cascade and field extractor
//!
//! Everything here is plain data plus pure predicates so priority order can be
//! inspected and tested without parsing any HTML.

use std::fmt;

/// Selector cascade tiers, tried in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    /// Curated job-board and ATS markup conventions
    KnownPattern,
    /// Elements whose class/id merely mention jobs, plus common containers
    HeuristicContainer,
    /// Small block elements whose text mentions a job keyword
    KeywordText,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::KnownPattern, Tier::HeuristicContainer, Tier::KeywordText];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KnownPattern => "known-pattern",
            Self::HeuristicContainer => "heuristic-container",
            Self::KeywordText => "keyword-text",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies the tier and pattern that produced a candidate set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StrategyId {
    pub tier: Tier,
    pub pattern: &'static str,
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tier, self.pattern)
    }
}

/// Tier 1: first pattern with at least one match wins
pub const KNOWN_PATTERNS: &[&str] = &[
    ".jobs-list .job-item",
    ".careers-jobs .job",
    ".opening",     // Greenhouse
    ".job-listing", // Lever-style boards, Workday tables
    ".job-card",
    ".posting", // Lever
    ".job-post",
    ".whr-item", // Workable embeds
    ".job-opening",
    ".career-item",
    ".vacancy",
    "[data-job-id]",
];

/// Tier 2: broader containment patterns, nested matches reduced to postings
pub const HEURISTIC_PATTERNS: &[&str] = &[
    "ul[class*='job'] > li",
    "ul[class*='career'] > li",
    "ul[class*='opening'] > li",
    "ul[class*='position'] > li",
    "[class*='job']",
    "[id*='job']",
    "[class*='career']",
    "[id*='career']",
    "[class*='vacanc']",
    "[class*='opening']",
    "[class*='position']",
    "[class*='listing']",
    "article",
];

/// Tier 3: block-level elements scanned for job keywords
pub const KEYWORD_BLOCK_SELECTOR: &str = "div, li, article, section, tr";

/// Keywords that mark a block as job-related (matched case-insensitively)
pub const JOB_KEYWORDS: &[&str] = &["job", "career", "position", "opening", "vacancy", "role"];

/// Keyword blocks must have fewer direct child elements than this
pub const MAX_KEYWORD_CHILDREN: usize = 5;

/// Default rejection threshold for the keyword-text tier
pub const DEFAULT_KEYWORD_MATCH_LIMIT: usize = 50;

/// Title selectors, most page-type-specific first
pub const TITLE_SELECTORS: &[&str] = &[
    ".job-title",
    "[data-qa='posting-name']",
    ".position-title",
    ".title",
    "h3",
    "h4",
    "h2",
    "h5",
    "a strong",
];

/// Direct text at or above this many characters is not used as a title
pub const MAX_DIRECT_TITLE_LEN: usize = 100;

/// Location selectors, most page-type-specific first
pub const LOCATION_SELECTORS: &[&str] = &[
    ".location",
    ".job-location",
    ".sort-by-location",
    "[class*='location']",
    ".city",
    ".office",
];

/// Label recognized (case-insensitively) in front of a location value
pub const LOCATION_LABEL: &str = "location:";

/// Location stored when extraction finds nothing
pub const UNSPECIFIED_LOCATION: &str = "Remote/Unspecified";

/// Returns true if the text mentions any job keyword
pub fn contains_job_keyword(text: &str) -> bool {
    let lowered = text.to_lowercase();
    JOB_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}

/// Keyword-tier predicate over an element's rendered text and direct child count
///
/// The child bounds keep whole-page wrappers (many children) and bare text
/// nodes (no children) out of the candidate set.
pub fn is_keyword_block(text: &str, child_elements: usize) -> bool {
    (1..MAX_KEYWORD_CHILDREN).contains(&child_elements) && contains_job_keyword(text)
}

/// Collapses whitespace runs to single spaces and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strips a leading `Location:` label, if present
pub fn strip_location_label(text: &str) -> &str {
    let trimmed = text.trim();
    match trimmed.get(..LOCATION_LABEL.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(LOCATION_LABEL) => {
            trimmed[LOCATION_LABEL.len()..].trim()
        }
        _ => trimmed,
    }
}

/// Returns the value following a `Location:` label in the text
///
/// The label must start the text or follow a non-alphabetic character, so
/// words ending in "location:" are not labels. `None` means there is no
/// label; `Some("")` means the label ends the text.
pub fn after_location_label(text: &str) -> Option<&str> {
    let lowered = text.to_ascii_lowercase();
    let (position, _) = lowered.match_indices(LOCATION_LABEL).find(|(position, _)| {
        lowered[..*position]
            .chars()
            .next_back()
            .map_or(true, |previous| !previous.is_alphabetic())
    })?;
    Some(text[position + LOCATION_LABEL.len()..].trim())
}
