use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Job-Sieve
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    /// Career pages seeded into the registry at startup
    #[serde(default, rename = "page")]
    pub pages: Vec<PageEntry>,
}

/// Scraper behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// Lower bound of the randomized delay between page visits (milliseconds)
    #[serde(rename = "min-delay-ms", default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Upper bound (inclusive) of the randomized delay between page visits (milliseconds)
    #[serde(rename = "max-delay-ms", default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Keyword-text tier selections larger than this are rejected
    #[serde(
        rename = "keyword-match-limit",
        default = "default_keyword_match_limit"
    )]
    pub keyword_match_limit: usize,

    /// Which render fetcher to use
    #[serde(default)]
    pub renderer: RendererKind,

    /// Timeout for fetching and rendering one page (seconds)
    #[serde(
        rename = "render-timeout-secs",
        default = "default_render_timeout_secs"
    )]
    pub render_timeout_secs: u64,

    /// Time to let client-side scripts run after load (chromium only, milliseconds)
    #[serde(rename = "settle-ms", default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Explicit Chromium binary; auto-detected when absent
    #[serde(rename = "chromium-path", default)]
    pub chromium_path: Option<String>,
}

impl ScraperConfig {
    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            keyword_match_limit: default_keyword_match_limit(),
            renderer: RendererKind::default(),
            render_timeout_secs: default_render_timeout_secs(),
            settle_ms: default_settle_ms(),
            chromium_path: None,
        }
    }
}

fn default_min_delay_ms() -> u64 {
    2000
}

fn default_max_delay_ms() -> u64 {
    5000
}

fn default_keyword_match_limit() -> usize {
    crate::extract::DEFAULT_KEYWORD_MATCH_LIMIT
}

fn default_render_timeout_secs() -> u64 {
    30
}

fn default_settle_ms() -> u64 {
    1500
}

/// Render fetcher selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Plain HTTP GET, no script execution
    #[default]
    Http,
    /// Headless Chromium (requires the `chromium` feature)
    Chromium,
}

/// Schedule trigger configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default)]
    pub interval: ScheduleInterval,
}

/// Supported scrape intervals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum ScheduleInterval {
    #[default]
    #[serde(rename = "1h")]
    Hourly,
    #[serde(rename = "6h")]
    EverySixHours,
}

impl ScheduleInterval {
    pub fn period(&self) -> Duration {
        match self {
            Self::Hourly => Duration::from_secs(60 * 60),
            Self::EverySixHours => Duration::from_secs(6 * 60 * 60),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "1h",
            Self::EverySixHours => "6h",
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the markdown listing report
    #[serde(rename = "summary-path")]
    pub summary_path: String,
}

/// A career page declared in the configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct PageEntry {
    pub url: String,
    pub name: String,
}
