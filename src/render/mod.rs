//! Render fetchers: turn a page URL into HTML ready for extraction
//!
//! Two implementations exist:
//! - [`HttpFetcher`] issues a plain GET (no script execution)
//! - `ChromiumFetcher` (feature `chromium`) drives a headless browser so
//!   client-side rendered boards are captured after their scripts run

#[cfg(feature = "chromium")]
mod chromium;
mod http;

#[cfg(feature = "chromium")]
pub use chromium::ChromiumFetcher;
pub use http::{build_http_client, HttpFetcher};

use crate::config::{Config, RendererKind};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Failure to obtain rendered HTML for a page
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("timed out fetching {url}")]
    Timeout { url: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("failed to render {url}: {message}")]
    Render { url: String, message: String },

    #[error("unusable response body from {url}: {message}")]
    Body { url: String, message: String },
}

impl FetchError {
    /// The URL whose fetch failed
    pub fn url(&self) -> &str {
        match self {
            Self::Network { url, .. }
            | Self::Timeout { url }
            | Self::Status { url, .. }
            | Self::Render { url, .. }
            | Self::Body { url, .. } => url,
        }
    }
}

/// Given a URL, returns the page's HTML after rendering
///
/// Implementations own any per-fetch resources (connections, browser
/// processes) and must release them before returning, on success or failure.
#[async_trait]
pub trait RenderFetcher: Send + Sync {
    async fn fetch_rendered(&self, url: &str) -> Result<String, FetchError>;
}

/// Builds the fetcher selected by `[scraper] renderer`
pub fn build_fetcher(config: &Config) -> crate::Result<Arc<dyn RenderFetcher>> {
    match config.scraper.renderer {
        RendererKind::Http => {
            let client = build_http_client(&config.user_agent, config.scraper.render_timeout())?;
            Ok(Arc::new(HttpFetcher::new(client)))
        }
        #[cfg(feature = "chromium")]
        RendererKind::Chromium => Ok(Arc::new(ChromiumFetcher::from_config(config))),
        #[cfg(not(feature = "chromium"))]
        RendererKind::Chromium => Err(crate::ConfigError::Validation(
            "renderer = \"chromium\" requires building with the `chromium` feature".to_string(),
        )
        .into()),
    }
}
