//! Page scraper: one career page in, newly stored listings out

use crate::extract::{identify, Cascade, FieldExtractor};
use crate::render::RenderFetcher;
use crate::storage::{listing_timestamp, CareerPage, JobListing, ListingStore};
use scraper::Html;
use std::sync::{Arc, Mutex, PoisonError};

/// Fetches one page, runs extraction over it and appends unseen listings
pub struct PageScraper<S> {
    fetcher: Arc<dyn RenderFetcher>,
    storage: Arc<Mutex<S>>,
    cascade: Cascade,
    fields: FieldExtractor,
}

impl<S: ListingStore> PageScraper<S> {
    pub fn new(
        fetcher: Arc<dyn RenderFetcher>,
        storage: Arc<Mutex<S>>,
        keyword_match_limit: usize,
    ) -> Self {
        Self {
            fetcher,
            storage,
            cascade: Cascade::new(keyword_match_limit),
            fields: FieldExtractor::new(),
        }
    }

    /// Scrapes a page and returns the listings it newly created
    ///
    /// Fetch and render failures are logged and yield an empty result; they
    /// never reach the caller.
    pub async fn scrape_page(&self, page: &CareerPage) -> Vec<JobListing> {
        tracing::info!("Scraping {} ({})", page.name, page.url);

        let html = match self.fetcher.fetch_rendered(&page.url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Failed to scrape {} ({}): {}", page.name, page.url, e);
                return Vec::new();
            }
        };

        let created = self.ingest(page, &html);
        tracing::info!("{}: {} new listing(s)", page.name, created.len());
        created
    }

    /// Runs extraction over already-rendered HTML for `page`
    ///
    /// Candidates without a title or a resolvable link are skipped, as are
    /// identities already in the store. A storage failure skips only the
    /// element it happened on.
    pub fn ingest(&self, page: &CareerPage, html: &str) -> Vec<JobListing> {
        let document = Html::parse_document(html);
        let selection = self.cascade.select(&document);

        let Some(strategy) = selection.strategy else {
            tracing::info!("No job candidates found on {}", page.url);
            return Vec::new();
        };
        tracing::debug!(
            "{}: {} candidate(s) via {}",
            page.name,
            selection.len(),
            strategy
        );

        let mut storage = self.storage.lock().unwrap_or_else(PoisonError::into_inner);
        let mut created = Vec::new();

        for element in selection.elements {
            let Some(fields) = self.fields.extract(element, &page.url) else {
                continue;
            };

            let id = identify(&page.name, &fields.title, &fields.location);
            match storage.contains_listing(&id) {
                Ok(true) => {
                    tracing::trace!("Already stored: {}", id);
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!("Failed to check listing {}: {}", id, e);
                    continue;
                }
            }

            let listing = JobListing {
                id,
                title: fields.title,
                company: page.name.clone(),
                location: fields.location,
                url: fields.url,
                source: page.url.clone(),
                scraped_at: listing_timestamp(),
            };

            if let Err(e) = storage.append_listing(&listing) {
                tracing::warn!("Failed to store listing {}: {}", listing.id, e);
                continue;
            }

            created.push(listing);
        }

        created
    }
}
