//! Headless Chromium render fetcher

use crate::config::Config;
use crate::render::{FetchError, RenderFetcher};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;

/// Renders pages in a headless browser launched for each fetch
///
/// The browser process never outlives a call to `fetch_rendered`: it is
/// closed after the content is captured, and also when navigation fails or
/// times out.
#[derive(Debug, Clone)]
pub struct ChromiumFetcher {
    executable: Option<PathBuf>,
    user_agent: String,
    timeout: Duration,
    settle: Duration,
}

impl ChromiumFetcher {
    pub fn new(
        executable: Option<PathBuf>,
        user_agent: String,
        timeout: Duration,
        settle: Duration,
    ) -> Self {
        Self {
            executable,
            user_agent,
            timeout,
            settle,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.scraper.chromium_path.as_ref().map(PathBuf::from),
            config.user_agent.header_value(),
            config.scraper.render_timeout(),
            Duration::from_millis(config.scraper.settle_ms),
        )
    }

    fn browser_config(&self, url: &str) -> Result<BrowserConfig, FetchError> {
        let mut builder = BrowserConfig::builder()
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg(format!("--user-agent={}", self.user_agent));

        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(|message| FetchError::Render {
            url: url.to_string(),
            message,
        })
    }

    async fn render(&self, browser: &Browser, url: &str) -> Result<String, FetchError> {
        let render_error = |e: chromiumoxide::error::CdpError| FetchError::Render {
            url: url.to_string(),
            message: e.to_string(),
        };

        let page = browser.new_page(url).await.map_err(render_error)?;
        page.wait_for_navigation().await.map_err(render_error)?;

        // Let client-side scripts populate the job board
        tokio::time::sleep(self.settle).await;

        page.content().await.map_err(render_error)
    }
}

#[async_trait]
impl RenderFetcher for ChromiumFetcher {
    async fn fetch_rendered(&self, url: &str) -> Result<String, FetchError> {
        let (mut browser, mut handler) = Browser::launch(self.browser_config(url)?)
            .await
            .map_err(|e| FetchError::Render {
                url: url.to_string(),
                message: format!("failed to launch browser: {}", e),
            })?;

        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let result = tokio::time::timeout(self.timeout, self.render(&browser, url)).await;

        if let Err(e) = browser.close().await {
            tracing::debug!("Browser close for {} failed: {}", url, e);
        }
        if let Err(e) = browser.wait().await {
            tracing::debug!("Browser exit for {} failed: {}", url, e);
        }
        events.abort();

        match result {
            Ok(rendered) => rendered,
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
        }
    }
}
