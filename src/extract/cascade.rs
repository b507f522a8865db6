//! Selector cascade: picks the candidate job elements in a rendered page
//!
//! Three tiers are tried in order and the first pattern that yields at least
//! one element wins. Pattern order inside each tier is fixed, so the same
//! document always produces the same candidates and the same [`StrategyId`].

use crate::extract::strategy::{
    is_keyword_block, StrategyId, Tier, DEFAULT_KEYWORD_MATCH_LIMIT, HEURISTIC_PATTERNS,
    KEYWORD_BLOCK_SELECTOR, KNOWN_PATTERNS,
};
use scraper::{ElementRef, Html, Selector};
use std::collections::{HashMap, HashSet};

/// Candidate elements chosen for one page
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    /// Candidate elements in document order
    pub elements: Vec<ElementRef<'a>>,

    /// The strategy that produced the elements; `None` when nothing matched
    pub strategy: Option<StrategyId>,
}

impl<'a> Selection<'a> {
    fn empty() -> Self {
        Self {
            elements: Vec::new(),
            strategy: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }
}

/// Compiled selector cascade
#[derive(Debug)]
pub struct Cascade {
    known: Vec<(&'static str, Selector)>,
    heuristic: Vec<(&'static str, Selector)>,
    keyword_blocks: Option<Selector>,
    keyword_match_limit: usize,
}

impl Cascade {
    /// Compiles the cascade with the given keyword-tier rejection threshold
    pub fn new(keyword_match_limit: usize) -> Self {
        Self {
            known: compile(KNOWN_PATTERNS),
            heuristic: compile(HEURISTIC_PATTERNS),
            keyword_blocks: Selector::parse(KEYWORD_BLOCK_SELECTOR).ok(),
            keyword_match_limit,
        }
    }

    /// Selects candidate job elements from a rendered document
    ///
    /// # Tiers
    ///
    /// | Tier | Matching | Post-filter |
    /// |------|----------|-------------|
    /// | Known pattern | curated selectors | none |
    /// | Heuristic container | class/id substring selectors, `article` | one element per posting |
    /// | Keyword text | block elements with 1-4 children mentioning a job keyword | one element per posting, rejected above the match limit |
    pub fn select<'a>(&self, document: &'a Html) -> Selection<'a> {
        if let Some(selection) = first_match(document, Tier::KnownPattern, &self.known, false) {
            return selection;
        }

        if let Some(selection) =
            first_match(document, Tier::HeuristicContainer, &self.heuristic, true)
        {
            return selection;
        }

        self.select_by_keyword(document)
    }

    fn select_by_keyword<'a>(&self, document: &'a Html) -> Selection<'a> {
        let Some(blocks) = &self.keyword_blocks else {
            return Selection::empty();
        };

        let matched: Vec<ElementRef<'a>> = document
            .select(blocks)
            .filter(|element| {
                let text = element.text().collect::<String>();
                is_keyword_block(&text, child_element_count(element))
            })
            .collect();

        let elements = postings(matched);
        if elements.is_empty() {
            tracing::trace!("No keyword-text candidates");
            return Selection::empty();
        }

        if elements.len() > self.keyword_match_limit {
            tracing::debug!(
                "Rejecting keyword-text selection of {} elements (limit {})",
                elements.len(),
                self.keyword_match_limit
            );
            return Selection::empty();
        }

        Selection {
            elements,
            strategy: Some(StrategyId {
                tier: Tier::KeywordText,
                pattern: KEYWORD_BLOCK_SELECTOR,
            }),
        }
    }
}

impl Default for Cascade {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORD_MATCH_LIMIT)
    }
}

/// Runs the default cascade over a document
///
/// # Example
///
/// ```
/// use job_sieve::extract::{select_candidates, Tier};
/// use scraper::Html;
///
/// let html = Html::parse_document(r#"<div class="opening"><a href="/1">Welder</a></div>"#);
/// let selection = select_candidates(&html);
/// assert_eq!(selection.len(), 1);
/// assert_eq!(selection.strategy.unwrap().tier, Tier::KnownPattern);
/// ```
pub fn select_candidates(document: &Html) -> Selection<'_> {
    Cascade::default().select(document)
}

fn compile(patterns: &[&'static str]) -> Vec<(&'static str, Selector)> {
    patterns
        .iter()
        .filter_map(|pattern| match Selector::parse(pattern) {
            Ok(selector) => Some((*pattern, selector)),
            Err(e) => {
                tracing::warn!("Skipping unparsable pattern {}: {:?}", pattern, e);
                None
            }
        })
        .collect()
}

fn first_match<'a>(
    document: &'a Html,
    tier: Tier,
    patterns: &[(&'static str, Selector)],
    nested_reduce: bool,
) -> Option<Selection<'a>> {
    for (pattern, selector) in patterns {
        let mut elements: Vec<ElementRef<'a>> = document.select(selector).collect();
        if nested_reduce {
            elements = postings(elements);
        }

        if !elements.is_empty() {
            return Some(Selection {
                elements,
                strategy: Some(StrategyId {
                    tier,
                    pattern: *pattern,
                }),
            });
        }

        tracing::trace!("{} pattern {} matched nothing", tier, pattern);
    }

    None
}

/// Reduces nested matches to one element per posting
///
/// A matched element holding two or more nested matches that could each stand
/// as a listing (text plus a link) is a wrapper, and gives way to them. Any
/// other matched element is a posting, and the matches inside it are its
/// fields.
fn postings<'a>(matched: Vec<ElementRef<'a>>) -> Vec<ElementRef<'a>> {
    let ids: HashSet<_> = matched.iter().map(|element| element.id()).collect();

    let mut nested: HashMap<_, Vec<ElementRef<'a>>> = HashMap::new();
    let mut pending = Vec::new();
    for element in &matched {
        let enclosing = element
            .ancestors()
            .map(|node| node.id())
            .find(|id| ids.contains(id));
        match enclosing {
            Some(id) => nested.entry(id).or_default().push(*element),
            None => pending.push(*element),
        }
    }

    let mut kept = HashSet::new();
    while let Some(element) = pending.pop() {
        let inner = nested
            .get(&element.id())
            .map(Vec::as_slice)
            .unwrap_or_default();

        if inner.iter().filter(|candidate| stands_alone(candidate)).count() >= 2 {
            pending.extend(inner.iter().copied());
        } else {
            kept.insert(element.id());
        }
    }

    matched
        .into_iter()
        .filter(|element| kept.contains(&element.id()))
        .collect()
}

/// True if the element has visible text and is or contains a link
fn stands_alone(element: &ElementRef<'_>) -> bool {
    let has_link = element
        .descendants()
        .filter_map(ElementRef::wrap)
        .any(|node| node.value().name() == "a" && node.value().attr("href").is_some());

    has_link && element.text().any(|text| !text.trim().is_empty())
}

fn child_element_count(element: &ElementRef<'_>) -> usize {
    element
        .children()
        .filter(|node| node.value().is_element())
        .count()
}
