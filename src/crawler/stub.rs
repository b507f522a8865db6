//! Scripted render fetcher for crawler tests

use crate::render::{FetchError, RenderFetcher};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct Script {
    calls: Vec<String>,
    cancel_on: Option<(usize, CancellationToken)>,
    gate: Option<Arc<Semaphore>>,
}

/// Serves canned HTML per URL; unknown URLs fail with a network error
#[derive(Clone, Default)]
pub(crate) struct StubFetcher {
    pages: Arc<HashMap<String, String>>,
    script: Arc<Mutex<Script>>,
}

impl StubFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_page(mut self, url: &str, html: &str) -> Self {
        Arc::make_mut(&mut self.pages).insert(url.to_string(), html.to_string());
        self
    }

    /// URLs fetched so far, in order
    pub(crate) fn calls(&self) -> Vec<String> {
        self.script.lock().unwrap().calls.clone()
    }

    /// Cancels `token` when the `call`-th fetch (1-based) starts
    pub(crate) fn cancel_on_call(&self, call: usize, token: CancellationToken) {
        self.script.lock().unwrap().cancel_on = Some((call, token));
    }

    /// Makes every fetch wait for a permit on the returned semaphore
    pub(crate) fn gate(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.script.lock().unwrap().gate = Some(Arc::clone(&gate));
        gate
    }
}

#[async_trait]
impl RenderFetcher for StubFetcher {
    async fn fetch_rendered(&self, url: &str) -> Result<String, FetchError> {
        let gate = {
            let mut script = self.script.lock().unwrap();
            script.calls.push(url.to_string());
            if let Some((call, token)) = &script.cancel_on {
                if *call == script.calls.len() {
                    token.cancel();
                }
            }
            script.gate.clone()
        };

        if let Some(gate) = gate {
            let _permit = gate.acquire().await;
        }

        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Network {
                url: url.to_string(),
                message: "connection refused".to_string(),
            })
    }
}
