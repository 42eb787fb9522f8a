//! Raw markup retrieval.
//!
//! [`Fetch`] is the seam between the pipeline and the network. The batch
//! runner only ever sees markup or a [`RetrievalError`]; retries and
//! pacing are not this layer's concern.

use crate::error::RetrievalError;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Browser-like agent; some publishers block obvious bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36";

/// Trait for retrieving the raw markup behind a URL.
pub trait Fetch {
    /// Fetch `url`, failing on transport errors and non-2xx statuses.
    async fn fetch(&self, url: &str) -> Result<String, RetrievalError>;
}

/// [`Fetch`] over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a client sending `user_agent` and giving up after `timeout`.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, RetrievalError> {
        let t0 = Instant::now();
        let transport = |source| RetrievalError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Non-success status");
            return Err(RetrievalError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(transport)?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(body)
    }
}
