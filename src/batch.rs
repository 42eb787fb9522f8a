//! Sequential batch processing of a manifest.
//!
//! Entries are handled one at a time, in manifest order. For each entry the
//! runner fetches the page, extracts its fields, and scores the body. A
//! failure on one entry is logged and recorded as a skip; the run always
//! carries on with the next entry. A fixed pause follows every entry
//! whatever its outcome, to stay polite to the publishers.
//!
//! Cancellation is checked between entries only. An entry that has started
//! always runs to completion (or to its deadline), so a cancelled run still
//! returns every row finished so far.

use crate::error::RetrievalError;
use crate::manifest::ManifestEntry;
use crate::models::{ArticleRecord, BatchRow, ResultRow};
use crate::scrapers::extract::FieldExtractor;
use crate::scrapers::fetch::Fetch;
use crate::scrapers::source;
use crate::sentiment::{Classify, SentimentAggregator};
use std::fmt;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tracing::{info, instrument, warn};

/// Create a linked cancel handle and token.
pub fn cancellation() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

/// Requests cancellation of every linked [`CancelToken`].
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Observes a [`CancelHandle`].
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested. Never resolves if the handle
    /// is dropped without cancelling.
    pub async fn cancelled(&mut self) {
        if self.rx.wait_for(|c| *c).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Why a manifest entry produced no row.
#[derive(Debug)]
pub enum SkipReason {
    Retrieval(RetrievalError),
    ContentUnavailable,
    DeadlineExceeded(Duration),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Retrieval(e) => write!(f, "{e}"),
            SkipReason::ContentUnavailable => f.write_str("content unavailable"),
            SkipReason::DeadlineExceeded(d) => write!(f, "entry exceeded its {d:?} deadline"),
        }
    }
}

#[derive(Debug)]
pub struct SkippedEntry {
    pub entry: ManifestEntry,
    pub reason: SkipReason,
}

/// Everything a batch run produced.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Extracted articles with their sentiment, in manifest order.
    pub rows: Vec<BatchRow>,
    pub skipped: Vec<SkippedEntry>,
    /// Entries that were started; less than the manifest length when cancelled.
    pub attempted: usize,
    pub cancelled: bool,
}

impl BatchOutcome {
    /// Rows whose sentiment was scored, as output table rows.
    pub fn result_rows(&self) -> Vec<ResultRow> {
        self.rows.iter().filter_map(BatchRow::result_row).collect()
    }
}

/// Drives fetch, extraction and scoring over a manifest.
pub struct BatchRunner<F, C> {
    fetcher: F,
    extractor: FieldExtractor,
    aggregator: SentimentAggregator<C>,
    pacing: Duration,
    entry_timeout: Duration,
}

impl<F: Fetch, C: Classify> BatchRunner<F, C> {
    pub fn new(
        fetcher: F,
        extractor: FieldExtractor,
        aggregator: SentimentAggregator<C>,
        pacing: Duration,
        entry_timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            aggregator,
            pacing,
            entry_timeout,
        }
    }

    /// Process `manifest` in order until it is exhausted or `cancel` fires.
    #[instrument(level = "info", skip_all, fields(entries = manifest.len()))]
    pub async fn run(&self, manifest: &[ManifestEntry], mut cancel: CancelToken) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for (i, entry) in manifest.iter().enumerate() {
            if cancel.is_cancelled() {
                info!(
                    remaining = manifest.len() - i,
                    "Cancellation requested; stopping before next entry"
                );
                outcome.cancelled = true;
                break;
            }

            outcome.attempted += 1;
            info!(
                n = i + 1,
                total = manifest.len(),
                url = %entry.url,
                date = %entry.date,
                "Processing entry"
            );

            let result = match timeout(self.entry_timeout, self.process(entry)).await {
                Ok(result) => result,
                Err(_) => Err(SkipReason::DeadlineExceeded(self.entry_timeout)),
            };
            match result {
                Ok(row) => outcome.rows.push(row),
                Err(reason) => {
                    warn!(url = %entry.url, %reason, "Skipping entry");
                    outcome.skipped.push(SkippedEntry {
                        entry: entry.clone(),
                        reason,
                    });
                }
            }

            if i + 1 < manifest.len() && !self.pacing.is_zero() {
                tokio::select! {
                    _ = sleep(self.pacing) => {}
                    _ = cancel.cancelled() => {}
                }
            }
        }
        // A request that lands during the last entry still counts.
        outcome.cancelled |= cancel.is_cancelled();

        info!(
            attempted = outcome.attempted,
            rows = outcome.rows.len(),
            skipped = outcome.skipped.len(),
            cancelled = outcome.cancelled,
            "Batch finished"
        );
        outcome
    }

    /// Fetch, extract and score a single manifest entry.
    pub async fn process(&self, entry: &ManifestEntry) -> Result<BatchRow, SkipReason> {
        let article = self
            .extract(&entry.url)
            .await
            .map_err(SkipReason::Retrieval)?;
        if !article.has_content() {
            return Err(SkipReason::ContentUnavailable);
        }
        let sentiment = self.aggregator.aggregate(&article.content).await;
        Ok(BatchRow {
            date: entry.date,
            article: article.with_sentiment(sentiment),
        })
    }

    /// Fetch and extract one URL without scoring it.
    pub async fn extract(&self, url: &str) -> Result<ArticleRecord, RetrievalError> {
        let markup = self.fetcher.fetch(url).await?;
        let source = source::classify(url);
        let fields = self.extractor.extract_markup(&markup, source);
        Ok(ArticleRecord::new(url, source, fields))
    }

    /// Fetch, extract and score one URL, keeping content-less articles.
    pub async fn inspect(&self, url: &str) -> Result<ArticleRecord, RetrievalError> {
        let article = self.extract(url).await?;
        let sentiment = self.aggregator.aggregate(&article.content).await;
        Ok(article.with_sentiment(sentiment))
    }
}
