//! Integration tests for the crawler
//!
//! These tests use wiremock to serve career pages and drive the full
//! fetch, extract, dedup and store cycle through the real HTTP fetcher.

use job_sieve::config::{
    Config, OutputConfig, PageEntry, ScheduleConfig, ScraperConfig, UserAgentConfig,
};
use job_sieve::crawler::build_crawler;
use job_sieve::output::generate_markdown_summary;
use job_sieve::storage::{
    ListingStore, MemoryStorage, PageRegistry, RunLog, RunStatus, SqliteStorage,
};
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with no politeness delay
fn create_test_config(pages: Vec<PageEntry>, dir: &Path) -> Config {
    Config {
        scraper: ScraperConfig {
            min_delay_ms: 0,
            max_delay_ms: 0,
            render_timeout_secs: 5,
            ..ScraperConfig::default()
        },
        schedule: ScheduleConfig::default(),
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            database_path: dir.join("jobs.db").display().to_string(),
            summary_path: dir.join("jobs.md").display().to_string(),
        },
        pages,
    }
}

fn page(url: String, name: &str) -> PageEntry {
    PageEntry {
        url,
        name: name.to_string(),
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><head><title>Careers</title></head><body>{}</body></html>", body),
        "text/html; charset=utf-8",
    )
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_end_to_end_and_rescrape() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    mount(
        &server,
        "/careers",
        html(r#"<div class="job-listing"><h3>Backend Engineer</h3><a href="/jobs/1">Apply</a></div>"#),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(vec![page(format!("{}/careers", base_url), "Acme")], dir.path());
    let storage = SqliteStorage::new(Path::new(&config.output.database_path)).unwrap();
    let crawler = build_crawler(&config, "hash", storage).unwrap();

    let report = crawler.scrape_registered().await.unwrap();
    assert_eq!(report.pages_visited, 1);
    assert_eq!(report.listings.len(), 1);

    let listing = &report.listings[0];
    assert_eq!(listing.company, "Acme");
    assert_eq!(listing.title, "Backend Engineer");
    assert_eq!(listing.location, "Remote/Unspecified");
    assert_eq!(listing.id, "acme-backend-engineer-remote/unspecified");
    assert_eq!(listing.url, format!("{}/jobs/1", base_url));
    assert_eq!(listing.source, format!("{}/careers", base_url));

    let rescrape = crawler.scrape_registered().await.unwrap();
    assert!(rescrape.listings.is_empty());

    let storage = crawler.storage();
    let storage = storage.lock().unwrap();
    assert_eq!(storage.list_listings().unwrap().len(), 1);

    let run = storage.latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.new_listings, 0);
}

#[tokio::test]
async fn test_partial_failure_isolation() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount(
        &server,
        "/one",
        html(r#"<div class="opening"><a href="/jobs/a">Welder</a></div>"#),
    )
    .await;
    mount(&server, "/two", ResponseTemplate::new(500)).await;
    mount(
        &server,
        "/three",
        html(r#"<div class="opening"><a href="/jobs/b">Baker</a></div>"#),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(
        vec![
            page(format!("{}/one", base_url), "One"),
            page(format!("{}/two", base_url), "Two"),
            page(format!("{}/three", base_url), "Three"),
        ],
        dir.path(),
    );
    let crawler = build_crawler(&config, "hash", MemoryStorage::new()).unwrap();

    let report = crawler.scrape_registered().await.unwrap();

    assert_eq!(report.pages_visited, 3);
    let found: Vec<(&str, &str)> = report
        .listings
        .iter()
        .map(|l| (l.company.as_str(), l.title.as_str()))
        .collect();
    assert_eq!(found, vec![("One", "Welder"), ("Three", "Baker")]);
}

#[tokio::test]
async fn test_unreachable_page_does_not_abort() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    mount(
        &server,
        "/careers",
        html(r#"<div class="job-card"><a href="/jobs/1">Line Cook</a></div>"#),
    )
    .await;

    // Bind and release a port so the connection is refused
    let dead_url = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}/careers", listener.local_addr().unwrap())
    };

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(
        vec![
            page(dead_url, "Gone"),
            page(format!("{}/careers", base_url), "Diner"),
        ],
        dir.path(),
    );
    let crawler = build_crawler(&config, "hash", MemoryStorage::new()).unwrap();

    let report = crawler.scrape_registered().await.unwrap();
    assert_eq!(report.pages_visited, 2);
    assert_eq!(report.listings.len(), 1);
    assert_eq!(report.listings[0].company, "Diner");
}

#[tokio::test]
async fn test_heuristic_page_with_location_label() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    mount(
        &server,
        "/company/careers",
        html(
            r#"<h1>Work with us</h1>
            <ul class="open-jobs">
                <li><a href="jobs/42"><strong>Data Analyst</strong></a><p>Location: Berlin, DE</p></li>
                <li><a href="jobs/43"><strong>Designer</strong></a><p>Location: Remote</p></li>
            </ul>"#,
        ),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(
        vec![page(format!("{}/company/careers", base_url), "Initech")],
        dir.path(),
    );
    let crawler = build_crawler(&config, "hash", MemoryStorage::new()).unwrap();

    let report = crawler.scrape_registered().await.unwrap();
    assert_eq!(report.listings.len(), 2);

    let analyst = &report.listings[0];
    assert_eq!(analyst.title, "Data Analyst");
    assert_eq!(analyst.location, "Berlin, DE");
    assert_eq!(analyst.id, "initech-data-analyst-berlin,-de");
    // Non-rooted hrefs join onto the origin, not the page's directory
    assert_eq!(analyst.url, format!("{}/jobs/42", base_url));
}

#[tokio::test]
async fn test_known_pattern_preferred_over_heuristic() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    mount(
        &server,
        "/careers",
        html(
            r#"<div class="careers-banner"><a href="/about">About our careers</a></div>
            <div class="posting"><h5 data-qa="posting-name">Platform Engineer</h5>
                <span class="sort-by-location">Lisbon</span>
                <a class="posting-btn-submit" href="https://jobs.example.org/acme/1">Apply</a></div>"#,
        ),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(vec![page(format!("{}/careers", base_url), "Acme")], dir.path());
    let crawler = build_crawler(&config, "hash", MemoryStorage::new()).unwrap();

    let report = crawler.scrape_registered().await.unwrap();
    assert_eq!(report.listings.len(), 1);
    assert_eq!(report.listings[0].title, "Platform Engineer");
    assert_eq!(report.listings[0].location, "Lisbon");
    assert_eq!(report.listings[0].url, "https://jobs.example.org/acme/1");
}

#[tokio::test]
async fn test_add_page_persists_and_scrapes() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    mount(
        &server,
        "/jobs",
        html(r#"<article><h2>Welder</h2><a href="/jobs/w">Details</a></article>"#),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(vec![], dir.path());
    let db_path = config.output.database_path.clone();

    {
        let storage = SqliteStorage::new(Path::new(&db_path)).unwrap();
        let crawler = build_crawler(&config, "hash", storage).unwrap();
        let created = crawler
            .add_page(&format!("{}/jobs", base_url), "Forge")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].title, "Welder");
    }

    let storage = SqliteStorage::new(Path::new(&db_path)).unwrap();
    let pages = storage.list_pages().unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].name, "Forge");
    assert_eq!(storage.list_listings().unwrap().len(), 1);

    let summary_path = Path::new(&config.output.summary_path);
    assert_eq!(generate_markdown_summary(&storage, summary_path).unwrap(), 1);
    let report = std::fs::read_to_string(summary_path).unwrap();
    assert!(report.contains("## Forge (1)"));
}

#[tokio::test]
async fn test_config_pages_seeded_once() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(
        vec![page(format!("{}/careers", base_url), "Acme")],
        dir.path(),
    );
    let db_path = config.output.database_path.clone();

    for _ in 0..2 {
        let storage = SqliteStorage::new(Path::new(&db_path)).unwrap();
        let crawler = build_crawler(&config, "hash", storage).unwrap();
        assert_eq!(crawler.list_pages().unwrap().len(), 1);
    }
}
