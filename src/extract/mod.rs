//! Heuristic extraction of job listings from rendered career pages
//!
//! Extraction is synchronous and works on an already-parsed [`scraper::Html`]
//! document. The [`Cascade`] picks candidate elements, the
//! [`FieldExtractor`] pulls a title, location and link out of each one, and
//! [`identify`] turns the result into a stable key.

mod cascade;
mod fields;
mod identity;
mod strategy;

pub use cascade::{select_candidates, Cascade, Selection};
pub use fields::{ExtractedFields, FieldExtractor};
pub use identity::identify;
pub use strategy::{
    StrategyId, Tier, DEFAULT_KEYWORD_MATCH_LIMIT, HEURISTIC_PATTERNS, JOB_KEYWORDS,
    KNOWN_PATTERNS, LOCATION_SELECTORS, TITLE_SELECTORS, UNSPECIFIED_LOCATION,
};
