//! Sentence classification with exponential backoff retry logic.
//!
//! The classifier itself is a black box: text in, a probability triple over
//! {negative, neutral, positive} out. This module provides the seam and its
//! implementations:
//! - [`Classify`]: Core trait for async sentence classification
//! - [`HttpClassifier`]: A hosted text-classification endpoint
//! - [`RetryClassify`]: Decorator that adds retry logic to any [`Classify`] implementation
//! - [`NoopClassifier`]: Stand-in when no classifier is configured
//! - [`ClassifierBackend`]: The one chosen at startup from configuration
//!
//! # Retry Strategy
//!
//! - Only transient failures are retried (transport errors, timeouts, 429, 5xx)
//! - Each attempt gets its own timeout; an attempt that overruns it is a
//!   transient failure
//! - Exponential backoff from `base_delay`, capped at 30 seconds
//! - Random jitter (0-250ms) added to each delay

use crate::config::ClassifierConfig;
use crate::error::ClassificationError;
use rand::{rng, Rng};
use serde::Deserialize;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, instrument, warn};

/// Probability triple returned for one sentence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probabilities {
    pub negative: f64,
    pub neutral: f64,
    pub positive: f64,
}

impl Probabilities {
    pub fn new(negative: f64, neutral: f64, positive: f64) -> Self {
        Self {
            negative,
            neutral,
            positive,
        }
    }

    /// Sentence score in `[-1, 1]`: `P(positive) - P(negative)`.
    ///
    /// Not normalised by `1 - P(neutral)`: a mostly-neutral sentence scores
    /// near zero.
    pub fn score(&self) -> f64 {
        self.positive - self.negative
    }
}

/// Trait for async sentence classification.
pub trait Classify {
    /// Classify one sentence.
    ///
    /// Inputs over the backend's length limit are the caller's problem: they
    /// must be truncated before this call.
    async fn classify(&self, text: &str) -> Result<Probabilities, ClassificationError>;
}

impl ClassificationError {
    /// Whether retrying the same input could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ClassificationError::Transport(_) | ClassificationError::Timeout(_) => true,
            ClassificationError::Status(code) => *code == 429 || *code >= 500,
            _ => false,
        }
    }
}

/// Classifier used when sentiment scoring is switched off.
///
/// Every call fails with [`ClassificationError::Disabled`], which leaves each
/// article's sentiment unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopClassifier;

impl Classify for NoopClassifier {
    async fn classify(&self, _text: &str) -> Result<Probabilities, ClassificationError> {
        Err(ClassificationError::Disabled)
    }
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Negative,
    Neutral,
    Positive,
}

fn class_of(label: &str) -> Option<Class> {
    let label = label.to_ascii_lowercase();
    if label.starts_with("neg") || label == "label_0" {
        Some(Class::Negative)
    } else if label.starts_with("neu") || label == "label_1" {
        Some(Class::Neutral)
    } else if label.starts_with("pos") || label == "label_2" {
        Some(Class::Positive)
    } else {
        None
    }
}

/// Parse a text-classification response body into a probability triple.
pub fn parse_probabilities(body: &str) -> Result<Probabilities, ClassificationError> {
    let scores = match serde_json::from_str::<InferenceResponse>(body)? {
        InferenceResponse::Nested(batches) => batches.into_iter().next().unwrap_or_default(),
        InferenceResponse::Flat(scores) => scores,
    };
    let find = |class: Class, name: &'static str| {
        scores
            .iter()
            .find(|s| class_of(&s.label) == Some(class))
            .map(|s| s.score)
            .ok_or(ClassificationError::MissingLabel(name))
    };
    Ok(Probabilities::new(
        find(Class::Negative, "negative")?,
        find(Class::Neutral, "neutral")?,
        find(Class::Positive, "positive")?,
    ))
}

/// [`Classify`] over a hosted text-classification endpoint.
///
/// Sends `{"inputs": text}` and expects a list of `{label, score}` objects,
/// optionally nested one level deep.
pub struct HttpClassifier {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl fmt::Debug for HttpClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClassifier")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl HttpClassifier {
    pub fn new(
        endpoint: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token,
        })
    }
}

impl Classify for HttpClassifier {
    #[instrument(level = "debug", skip_all, fields(chars = text.chars().count()))]
    async fn classify(&self, text: &str) -> Result<Probabilities, ClassificationError> {
        let t0 = Instant::now();
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "inputs": text }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Classifier returned an error status");
            return Err(ClassificationError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        let probabilities = parse_probabilities(&body)?;
        debug!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            ?probabilities,
            "Classified sentence"
        );
        Ok(probabilities)
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`Classify`] implementation.
///
/// The delay between retries follows this formula:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryClassify<T> {
    /// The underlying classifier to wrap.
    inner: T,
    /// Maximum number of retry attempts before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: Duration,
    /// Maximum delay cap to prevent excessive waiting.
    max_delay: Duration,
    /// Deadline for a single attempt, if any.
    attempt_timeout: Option<Duration>,
}

impl<T> RetryClassify<T>
where
    T: Classify,
{
    pub fn new(inner: T, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: Duration::from_secs(30),
            attempt_timeout: None,
        }
    }

    /// Bound every attempt by `limit`.
    pub fn with_attempt_timeout(mut self, limit: Duration) -> Self {
        self.attempt_timeout = Some(limit);
        self
    }

    async fn attempt(&self, text: &str) -> Result<Probabilities, ClassificationError> {
        match self.attempt_timeout {
            Some(limit) => match timeout(limit, self.inner.classify(text)).await {
                Ok(result) => result,
                Err(_) => Err(ClassificationError::Timeout(limit)),
            },
            None => self.inner.classify(text).await,
        }
    }
}

impl<T> fmt::Debug for RetryClassify<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryClassify")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .field("attempt_timeout", &self.attempt_timeout)
            .finish()
    }
}

impl<T> Classify for RetryClassify<T>
where
    T: Classify,
{
    async fn classify(&self, text: &str) -> Result<Probabilities, ClassificationError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.attempt(text).await {
                Ok(probabilities) => return Ok(probabilities),
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) => {
                    attempt += 1;
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "classify() exhausted retries"
                        );
                        return Err(e);
                    }

                    let exponent = (attempt - 1).min(16) as u32;
                    let delay = self
                        .base_delay
                        .saturating_mul(1 << exponent)
                        .min(self.max_delay);
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + Duration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_total = total_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "classify() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// The classifier chosen once at startup.
#[derive(Debug)]
pub enum ClassifierBackend {
    Disabled(NoopClassifier),
    Remote(RetryClassify<HttpClassifier>),
}

impl ClassifierBackend {
    /// Pick a backend from configuration.
    ///
    /// Scoring is off unless it is enabled and an endpoint is set.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self, reqwest::Error> {
        match (config.enabled, config.endpoint.as_deref()) {
            (true, Some(endpoint)) if !endpoint.trim().is_empty() => {
                let http = HttpClassifier::new(endpoint, config.token.clone(), config.request_timeout())?;
                info!(endpoint, max_retries = config.max_retries, "Sentiment classifier enabled");
                Ok(ClassifierBackend::Remote(
                    RetryClassify::new(http, config.max_retries, config.retry_base_delay())
                        .with_attempt_timeout(config.request_timeout()),
                ))
            }
            (true, _) => {
                warn!("Sentiment classifier enabled without an endpoint; scoring is disabled");
                Ok(ClassifierBackend::Disabled(NoopClassifier))
            }
            (false, _) => {
                info!("Sentiment classifier disabled");
                Ok(ClassifierBackend::Disabled(NoopClassifier))
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, ClassifierBackend::Remote(_))
    }
}

impl Classify for ClassifierBackend {
    async fn classify(&self, text: &str) -> Result<Probabilities, ClassificationError> {
        match self {
            ClassifierBackend::Disabled(c) => c.classify(text).await,
            ClassifierBackend::Remote(c) => c.classify(text).await,
        }
    }
}
