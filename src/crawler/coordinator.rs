//! Crawl loop and registry operations
//!
//! The [`Crawler`] owns the page scraper, the politeness delay, the
//! scrape-in-progress guard and the cancellation token. Pages are always
//! visited one at a time.

use crate::config::{PageEntry, ScraperConfig};
use crate::crawler::politeness::PolitenessDelay;
use crate::crawler::scraper::PageScraper;
use crate::render::RenderFetcher;
use crate::storage::{CareerPage, JobListing, RunStatus, Storage};
use crate::url::validate_page_url;
use crate::{ConfigError, Result, SieveError};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Outcome of one crawl run
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Run log ID; `None` if the run could not be recorded
    pub run_id: Option<i64>,
    /// Pages whose fetch was attempted
    pub pages_visited: usize,
    /// Pages the run was asked to visit
    pub pages_total: usize,
    /// Listings created during the run, in discovery order
    pub listings: Vec<JobListing>,
    /// True if the run stopped early on cancellation
    pub cancelled: bool,
}

/// Sequential crawler over a page registry and listing store
pub struct Crawler<S> {
    scraper: PageScraper<S>,
    storage: Arc<Mutex<S>>,
    delay: PolitenessDelay,
    run_guard: tokio::sync::Mutex<()>,
    cancel: CancellationToken,
    config_hash: String,
}

impl<S: Storage> Crawler<S> {
    /// Creates a crawler
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Render fetcher used for every page
    /// * `storage` - Registry, listing store and run log backend
    /// * `config` - Delay bounds and cascade tuning
    /// * `config_hash` - Recorded on every run
    pub fn new(
        fetcher: Arc<dyn RenderFetcher>,
        storage: S,
        config: &ScraperConfig,
        config_hash: impl Into<String>,
    ) -> Self {
        let storage = Arc::new(Mutex::new(storage));

        Self {
            scraper: PageScraper::new(fetcher, Arc::clone(&storage), config.keyword_match_limit),
            storage,
            delay: PolitenessDelay::from_config(config),
            run_guard: tokio::sync::Mutex::new(()),
            cancel: CancellationToken::new(),
            config_hash: config_hash.into(),
        }
    }

    /// Shared handle to the storage backend
    pub fn storage(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.storage)
    }

    /// Token that stops the current run before its next page fetch
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// True while a crawl run or on-demand scrape holds the guard
    pub fn is_running(&self) -> bool {
        self.run_guard.try_lock().is_err()
    }

    fn with_storage<T>(&self, f: impl FnOnce(&mut S) -> T) -> T {
        let mut storage = self.storage.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut storage)
    }

    /// Scrapes every page in order, waiting a politeness delay between visits
    ///
    /// Fails only with [`SieveError::ScrapeInProgress`] when another run holds
    /// the guard. Per-page failures are absorbed by the page scraper, so a run
    /// always completes with whatever listings it could extract.
    pub async fn scrape_all(&self, pages: &[CareerPage]) -> Result<CrawlReport> {
        let _guard = self
            .run_guard
            .try_lock()
            .map_err(|_| SieveError::ScrapeInProgress)?;

        let start_time = Instant::now();
        let run_id = match self.with_storage(|s| s.start_run(&self.config_hash)) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!("Failed to record run start: {}", e);
                None
            }
        };

        tracing::info!("Starting scrape of {} page(s)", pages.len());

        let mut report = CrawlReport {
            run_id,
            pages_total: pages.len(),
            ..CrawlReport::default()
        };

        for (index, page) in pages.iter().enumerate() {
            if index > 0 && !self.delay.wait(&self.cancel).await {
                report.cancelled = true;
                break;
            }

            if self.cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let created = self.scraper.scrape_page(page).await;
            report.pages_visited += 1;
            report.listings.extend(created);
        }

        if report.cancelled {
            tracing::warn!(
                "Scrape cancelled after {}/{} page(s)",
                report.pages_visited,
                report.pages_total
            );
        }

        if let Some(run_id) = run_id {
            let status = if report.cancelled {
                RunStatus::Cancelled
            } else {
                RunStatus::Completed
            };
            let visited = u32::try_from(report.pages_visited).unwrap_or(u32::MAX);
            let created = u32::try_from(report.listings.len()).unwrap_or(u32::MAX);

            if let Err(e) = self.with_storage(|s| s.finish_run(run_id, status, visited, created)) {
                tracing::warn!("Failed to record run {} finish: {}", run_id, e);
            }
        }

        tracing::info!(
            "Scrape finished: {} new listing(s) from {} page(s) in {:?}",
            report.listings.len(),
            report.pages_visited,
            start_time.elapsed()
        );

        Ok(report)
    }

    /// Scrapes every page currently in the registry
    pub async fn scrape_registered(&self) -> Result<CrawlReport> {
        let pages = self.with_storage(|s| s.list_pages())?;
        self.scrape_all(&pages).await
    }

    /// Scrapes a single page immediately, without a politeness delay
    ///
    /// Waits for any in-progress run to finish first.
    pub async fn scrape_page_now(&self, page: &CareerPage) -> Vec<JobListing> {
        let _guard = self.run_guard.lock().await;
        self.scraper.scrape_page(page).await
    }

    /// Registers a page and scrapes it on demand
    ///
    /// Returns `None` if the URL was already registered; nothing is scraped
    /// in that case.
    pub async fn add_page(&self, url: &str, name: &str) -> Result<Option<Vec<JobListing>>> {
        let url = url.trim();
        let name = name.trim();

        validate_page_url(url)?;
        if name.is_empty() {
            return Err(ConfigError::Validation("page name cannot be empty".to_string()).into());
        }

        let page = CareerPage::new(url, name);
        if !self.with_storage(|s| s.add_page(&page))? {
            tracing::info!("{} is already registered", url);
            return Ok(None);
        }

        tracing::info!("Registered {} ({})", name, url);
        Ok(Some(self.scrape_page_now(&page).await))
    }

    /// Unregisters a page; its listings are kept
    pub fn remove_page(&self, url: &str) -> Result<bool> {
        let removed = self.with_storage(|s| s.remove_page(url.trim()))?;
        if removed {
            tracing::info!("Removed {}", url);
        }
        Ok(removed)
    }

    pub fn list_pages(&self) -> Result<Vec<CareerPage>> {
        Ok(self.with_storage(|s| s.list_pages())?)
    }

    /// Inserts configured pages missing from the registry
    ///
    /// Pages added by other means are left alone. Returns how many were added.
    pub fn sync_registry(&self, entries: &[PageEntry]) -> Result<usize> {
        let mut added = 0;
        self.with_storage(|s| -> Result<()> {
            for entry in entries {
                if s.add_page(&CareerPage::new(entry.url.trim(), entry.name.trim()))? {
                    tracing::debug!("Seeded {} ({})", entry.name, entry.url);
                    added += 1;
                }
            }
            Ok(())
        })?;

        if added > 0 {
            tracing::info!("Seeded {} page(s) from configuration", added);
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::stub::StubFetcher;
    use crate::storage::{MemoryStorage, PageRegistry, RunLog};
    use std::time::Duration;

    fn job_page(title: &str) -> String {
        format!(
            r#"<div class="opening"><h3>{}</h3><a href="/jobs/{}">Apply</a></div>"#,
            title,
            title.to_lowercase()
        )
    }

    fn config(delay_ms: u64) -> ScraperConfig {
        ScraperConfig {
            min_delay_ms: delay_ms,
            max_delay_ms: delay_ms,
            ..ScraperConfig::default()
        }
    }

    fn crawler(fetcher: StubFetcher) -> Crawler<MemoryStorage> {
        Crawler::new(Arc::new(fetcher), MemoryStorage::new(), &config(0), "hash")
    }

    fn pages() -> Vec<CareerPage> {
        vec![
            CareerPage::new("https://one.com/careers", "One"),
            CareerPage::new("https://two.com/careers", "Two"),
            CareerPage::new("https://three.com/careers", "Three"),
        ]
    }

    #[tokio::test]
    async fn test_partial_failure_isolation() {
        // two.com is not stubbed, so its fetch fails
        let fetcher = StubFetcher::new()
            .with_page("https://one.com/careers", &job_page("Welder"))
            .with_page("https://three.com/careers", &job_page("Baker"));
        let crawler = crawler(fetcher.clone());

        let report = crawler.scrape_all(&pages()).await.unwrap();

        assert_eq!(report.pages_visited, 3);
        assert!(!report.cancelled);
        let companies: Vec<&str> = report.listings.iter().map(|l| l.company.as_str()).collect();
        assert_eq!(companies, vec!["One", "Three"]);
        assert_eq!(
            fetcher.calls(),
            vec![
                "https://one.com/careers",
                "https://two.com/careers",
                "https://three.com/careers"
            ]
        );
    }

    #[tokio::test]
    async fn test_scrape_all_twice_yields_nothing_new() {
        let fetcher = StubFetcher::new()
            .with_page("https://one.com/careers", &job_page("Welder"))
            .with_page("https://two.com/careers", &job_page("Baker"))
            .with_page("https://three.com/careers", &job_page("Cook"));
        let crawler = crawler(fetcher);

        assert_eq!(crawler.scrape_all(&pages()).await.unwrap().listings.len(), 3);
        assert!(crawler
            .scrape_all(&pages())
            .await
            .unwrap()
            .listings
            .is_empty());
    }

    #[tokio::test]
    async fn test_run_is_recorded() {
        let fetcher = StubFetcher::new().with_page("https://one.com/careers", &job_page("Welder"));
        let crawler = crawler(fetcher);

        let report = crawler.scrape_all(&pages()).await.unwrap();

        let storage = crawler.storage();
        let run = storage.lock().unwrap().latest_run().unwrap().unwrap();
        assert_eq!(Some(run.id), report.run_id);
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.config_hash, "hash");
        assert_eq!(run.pages_visited, 3);
        assert_eq!(run.new_listings, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_between_pages_only() {
        let fetcher = StubFetcher::new();
        let crawler = Crawler::new(Arc::new(fetcher), MemoryStorage::new(), &config(2000), "h");

        let start = tokio::time::Instant::now();
        crawler.scrape_all(&pages()).await.unwrap();
        let elapsed = start.elapsed();

        // Three pages, two gaps
        assert!(elapsed >= Duration::from_millis(4000));
        assert!(elapsed < Duration::from_millis(5000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_scrape_page_now_skips_delay() {
        let fetcher = StubFetcher::new().with_page("https://one.com/careers", &job_page("Welder"));
        let crawler = Crawler::new(Arc::new(fetcher), MemoryStorage::new(), &config(60_000), "h");

        let start = tokio::time::Instant::now();
        let created = crawler.scrape_page_now(&pages()[0]).await;
        assert_eq!(created.len(), 1);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_cancel_before_run() {
        let fetcher = StubFetcher::new();
        let crawler = crawler(fetcher.clone());
        crawler.cancel();

        let report = crawler.scrape_all(&pages()).await.unwrap();
        assert!(report.cancelled);
        assert_eq!(report.pages_visited, 0);
        assert!(fetcher.calls().is_empty());

        let storage = crawler.storage();
        let run = storage.lock().unwrap().latest_run().unwrap().unwrap();
        assert_eq!(run.status, RunStatus::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_delay() {
        let fetcher = StubFetcher::new();
        let crawler = Crawler::new(
            Arc::new(fetcher.clone()),
            MemoryStorage::new(),
            &config(60_000),
            "h",
        );
        fetcher.cancel_on_call(1, crawler.cancellation_token());

        let start = tokio::time::Instant::now();
        let report = crawler.scrape_all(&pages()).await.unwrap();

        assert!(report.cancelled);
        assert_eq!(report.pages_visited, 1);
        assert_eq!(fetcher.calls().len(), 1);
        assert!(start.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_overlapping_run_rejected() {
        let fetcher = StubFetcher::new();
        let gate = fetcher.gate();
        let crawler = Arc::new(crawler(fetcher));

        let first = {
            let crawler = Arc::clone(&crawler);
            tokio::spawn(async move { crawler.scrape_all(&pages()[..1]).await })
        };

        while !crawler.is_running() {
            tokio::task::yield_now().await;
        }

        let second = crawler.scrape_all(&pages()).await;
        assert!(matches!(second, Err(SieveError::ScrapeInProgress)));

        gate.add_permits(1);
        let report = first.await.unwrap().unwrap();
        assert_eq!(report.pages_visited, 1);
        assert!(!crawler.is_running());
    }

    #[tokio::test]
    async fn test_add_page_scrapes_once() {
        let fetcher = StubFetcher::new().with_page("https://one.com/careers", &job_page("Welder"));
        let crawler = crawler(fetcher.clone());

        let created = crawler
            .add_page(" https://one.com/careers ", "One")
            .await
            .unwrap();
        assert_eq!(created.map(|l| l.len()), Some(1));

        let again = crawler
            .add_page("https://one.com/careers", "One")
            .await
            .unwrap();
        assert!(again.is_none());
        assert_eq!(fetcher.calls().len(), 1);

        assert_eq!(
            crawler.list_pages().unwrap(),
            vec![CareerPage::new("https://one.com/careers", "One")]
        );
    }

    #[tokio::test]
    async fn test_add_page_rejects_bad_input() {
        let crawler = crawler(StubFetcher::new());

        assert!(matches!(
            crawler.add_page("ftp://one.com", "One").await,
            Err(SieveError::Url(_))
        ));
        assert!(matches!(
            crawler.add_page("https://one.com", "  ").await,
            Err(SieveError::Config(_))
        ));
        assert!(crawler.list_pages().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_page_keeps_listings() {
        let fetcher = StubFetcher::new().with_page("https://one.com/careers", &job_page("Welder"));
        let crawler = crawler(fetcher);
        crawler
            .add_page("https://one.com/careers", "One")
            .await
            .unwrap();

        assert!(crawler.remove_page("https://one.com/careers").unwrap());
        assert!(!crawler.remove_page("https://one.com/careers").unwrap());

        let storage = crawler.storage();
        assert_eq!(storage.lock().unwrap().listing_count(), 1);
        assert!(storage.lock().unwrap().list_pages().unwrap().is_empty());
    }

    #[test]
    fn test_sync_registry_only_adds_missing() {
        let crawler = crawler(StubFetcher::new());
        crawler
            .storage()
            .lock()
            .unwrap()
            .add_page(&CareerPage::new("https://manual.com/jobs", "Manual"))
            .unwrap();

        let entries = vec![
            PageEntry {
                url: "https://one.com/careers".to_string(),
                name: "One".to_string(),
            },
            PageEntry {
                url: "https://manual.com/jobs".to_string(),
                name: "Manual".to_string(),
            },
        ];

        assert_eq!(crawler.sync_registry(&entries).unwrap(), 1);
        assert_eq!(crawler.sync_registry(&entries).unwrap(), 0);

        let urls: Vec<String> = crawler
            .list_pages()
            .unwrap()
            .into_iter()
            .map(|p| p.url)
            .collect();
        assert_eq!(urls, vec!["https://manual.com/jobs", "https://one.com/careers"]);
    }
}
