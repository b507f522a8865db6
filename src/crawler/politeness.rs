//! Randomized delay between page visits

use crate::config::ScraperConfig;
use rand::Rng;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Uniformly random pause drawn from `[min, max]` milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolitenessDelay {
    min_ms: u64,
    max_ms: u64,
}

impl PolitenessDelay {
    /// Creates a delay; bounds given in the wrong order are swapped
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: min_ms.max(max_ms),
        }
    }

    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::new(config.min_delay_ms, config.max_delay_ms)
    }

    /// Draws one delay
    pub fn sample(&self) -> Duration {
        if self.min_ms == self.max_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rand::thread_rng().gen_range(self.min_ms..=self.max_ms))
    }

    /// Sleeps for one sampled delay
    ///
    /// Returns false if `cancel` fired first.
    pub async fn wait(&self, cancel: &CancellationToken) -> bool {
        let delay = self.sample();
        tracing::debug!("Waiting {:?} before next page", delay);

        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }
}
