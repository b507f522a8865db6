//! Field extraction for a single candidate element
//!
//! Title and location each walk an ordered list of selectors over the
//! candidate's descendants. The first selector that produces non-empty text
//! wins; later selectors are never consulted.

use crate::extract::strategy::{
    after_location_label, collapse_whitespace, strip_location_label, LOCATION_SELECTORS,
    MAX_DIRECT_TITLE_LEN, TITLE_SELECTORS, UNSPECIFIED_LOCATION,
};
use crate::url::resolve;
use scraper::{ElementRef, Selector};

/// Fields pulled out of one candidate element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
    pub title: String,
    /// Location, already defaulted to [`UNSPECIFIED_LOCATION`]
    pub location: String,
    /// Absolute job URL
    pub url: String,
}

/// Compiled title/location/link selectors
#[derive(Debug)]
pub struct FieldExtractor {
    title: Vec<Selector>,
    location: Vec<Selector>,
    link: Option<Selector>,
}

impl FieldExtractor {
    pub fn new() -> Self {
        Self {
            title: compile(TITLE_SELECTORS),
            location: compile(LOCATION_SELECTORS),
            link: Selector::parse("a[href]").ok(),
        }
    }

    /// Extracts the job title, or an empty string if nothing matched
    ///
    /// After the selectors, falls back to the element's own text when it
    /// is short, and finally to the first child element with any text.
    pub fn extract_title(&self, element: ElementRef<'_>) -> String {
        for selector in &self.title {
            if let Some(text) = first_descendant_text(element, selector) {
                return text;
            }
        }

        let direct = collapse_whitespace(&direct_text(element));
        if !direct.is_empty() && direct.chars().count() < MAX_DIRECT_TITLE_LEN {
            return direct;
        }

        element
            .children()
            .filter_map(ElementRef::wrap)
            .map(|child| collapse_whitespace(&child.text().collect::<String>()))
            .find(|text| !text.is_empty())
            .unwrap_or_default()
    }

    /// Extracts the job location, or an empty string if nothing matched
    ///
    /// A leading `Location:` label is stripped from selector results. When no
    /// selector matches, the element's text is scanned for the label and the
    /// value after it (or the next text run) is used.
    pub fn extract_location(&self, element: ElementRef<'_>) -> String {
        for selector in &self.location {
            if let Some(text) = first_descendant_text(element, selector) {
                let value = strip_location_label(&text);
                if !value.is_empty() {
                    return value.to_string();
                }
            }
        }

        labelled_location(element).unwrap_or_default()
    }

    /// Finds the raw job link: the element itself if it is a link, else its
    /// first descendant link
    pub fn extract_href<'a>(&self, element: ElementRef<'a>) -> Option<&'a str> {
        let value = element.value();
        if value.name() == "a" {
            if let Some(href) = value.attr("href") {
                return Some(href);
            }
        }

        let link = self.link.as_ref()?;
        element
            .select(link)
            .find(|candidate| candidate.id() != element.id())
            .and_then(|anchor| anchor.value().attr("href"))
    }

    /// Extracts every field needed for a listing
    ///
    /// Returns `None` when the title or resolved URL is missing; that is the
    /// expected outcome for false-positive candidates, not an error.
    pub fn extract(&self, element: ElementRef<'_>, page_url: &str) -> Option<ExtractedFields> {
        let title = self.extract_title(element);
        if title.is_empty() {
            tracing::trace!("Skipping <{}>: no title", element.value().name());
            return None;
        }

        let Some(url) = self
            .extract_href(element)
            .and_then(|href| resolve(page_url, href))
        else {
            tracing::trace!("Skipping '{}': no resolvable link", title);
            return None;
        };

        let location = self.extract_location(element);
        let location = if location.is_empty() {
            UNSPECIFIED_LOCATION.to_string()
        } else {
            location
        };

        Some(ExtractedFields {
            title,
            location,
            url,
        })
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn compile(patterns: &[&str]) -> Vec<Selector> {
    patterns
        .iter()
        .filter_map(|pattern| Selector::parse(pattern).ok())
        .collect()
}

/// First matching descendant (never the element itself) with non-empty text
fn first_descendant_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .filter(|candidate| candidate.id() != element.id())
        .map(|candidate| collapse_whitespace(&candidate.text().collect::<String>()))
        .find(|text| !text.is_empty())
}

/// Text nodes that are direct children of the element
fn direct_text(element: ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| &**text)
        .collect::<Vec<&str>>()
        .join(" ")
}

fn labelled_location(element: ElementRef<'_>) -> Option<String> {
    let runs: Vec<String> = element
        .text()
        .map(collapse_whitespace)
        .filter(|run| !run.is_empty())
        .collect();

    for (index, run) in runs.iter().enumerate() {
        let Some(value) = after_location_label(run) else {
            continue;
        };

        if !value.is_empty() {
            return Some(value.to_string());
        }

        // Label and value split across elements: <span>Location:</span> <span>Oslo</span>
        if let Some(next) = runs.get(index + 1) {
            return Some(next.clone());
        }
    }

    None
}
