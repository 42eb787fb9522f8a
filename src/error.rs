//! Error types for the extraction and scoring pipeline.
//!
//! Every error here is contained at the granularity it names: a
//! [`RetrievalError`] skips one manifest entry, a [`ClassificationError`]
//! drops one sentence, a [`ManifestRowError`] drops one input row. Only
//! [`PipelineError`] reaches the outer surfaces (reading manifests, writing
//! outputs, loading configuration).
//!
//! Fallback chains that run dry and content without usable sentences are not
//! errors at all. They resolve to sentinel values on
//! [`ArticleRecord`](crate::models::ArticleRecord) and to unavailable
//! [`SentimentRecord`](crate::models::SentimentRecord)s.

use std::time::Duration;
use thiserror::Error;

/// Failure to retrieve raw markup for a URL.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("no index rule for source {0}")]
    NoIndexRule(String),
}

/// Failure of the sentence classifier on a single input.
#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("sentiment classifier is disabled")]
    Disabled,

    #[error("classifier request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("classifier returned HTTP {0}")]
    Status(u16),

    #[error("classifier response missing the {0} class")]
    MissingLabel(&'static str),

    #[error("classifier response could not be parsed: {0}")]
    BadResponse(#[from] serde_json::Error),

    #[error("classifier timed out after {0:?}")]
    Timeout(Duration),
}

/// A batch manifest row that cannot be processed.
#[derive(Debug, Error)]
pub enum ManifestRowError {
    #[error("row {line}: {source}")]
    Csv {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("row {line}: url is empty")]
    EmptyUrl { line: u64 },

    #[error("row {line}: date {value:?} is not a YYYY-MM-DD date")]
    BadDate { line: u64, value: String },
}

/// Errors at the outer surfaces of the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
}
