//! Pipeline configuration.
//!
//! Settings come from an optional YAML file; every key has a default, so an
//! empty or partial file is valid. Command-line flags are applied on top in
//! `main`.
//!
//! ```yaml
//! user_agent: "Mozilla/5.0 ..."
//! fetch_timeout_secs: 30
//! entry_timeout_secs: 300
//! pacing_delay_ms: 1000
//! extraction:
//!   content_min_chars: 100
//!   pooled_paragraph_min_chars: 20
//! sentiment:
//!   neutral_threshold: 0.1
//!   min_sentence_chars: 5
//!   max_input_chars: 512
//! classifier:
//!   enabled: true
//!   endpoint: "http://localhost:8080/classify"
//!   request_timeout_secs: 30
//!   max_retries: 3
//! timeline:
//!   rolling_window: 5
//! ```

use crate::error::PipelineError;
use crate::scrapers::fetch::DEFAULT_USER_AGENT;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// `User-Agent` sent with every page request.
    pub user_agent: String,
    pub fetch_timeout_secs: u64,
    /// Deadline for fetching, extracting and scoring one manifest entry.
    pub entry_timeout_secs: u64,
    /// Pause after every manifest entry, successful or not.
    pub pacing_delay_ms: u64,
    pub extraction: ExtractionConfig,
    pub sentiment: SentimentConfig,
    pub classifier: ClassifierConfig,
    pub timeline: TimelineConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fetch_timeout_secs: 30,
            entry_timeout_secs: 300,
            pacing_delay_ms: 1000,
            extraction: ExtractionConfig::default(),
            sentiment: SentimentConfig::default(),
            classifier: ClassifierConfig::default(),
            timeline: TimelineConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load from `path`, or return the defaults when no path is given.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, PipelineError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&raw)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, PipelineError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn entry_timeout(&self) -> Duration {
        Duration::from_secs(self.entry_timeout_secs)
    }

    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Body text longer than this is accepted without trying later locators.
    pub content_min_chars: usize,
    /// Minimum paragraph length for the page-wide last-resort locator.
    pub pooled_paragraph_min_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            content_min_chars: 100,
            pooled_paragraph_min_chars: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    /// Half-width of the neutral band, shared by sentence buckets and the
    /// article label.
    pub neutral_threshold: f64,
    /// Sentences with fewer characters are not scored.
    pub min_sentence_chars: usize,
    /// Sentences are cut to this many characters before classification.
    pub max_input_chars: usize,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            neutral_threshold: 0.1,
            min_sentence_chars: 5,
            max_input_chars: 512,
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Capability flag: scoring runs only when enabled and an endpoint is set.
    pub enabled: bool,
    pub endpoint: Option<String>,
    pub token: Option<String>,
    /// Deadline for one classification attempt; a timed-out attempt is retried.
    pub request_timeout_secs: u64,
    pub max_retries: usize,
    pub retry_base_delay_ms: u64,
}

impl std::fmt::Debug for ClassifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierConfig")
            .field("enabled", &self.enabled)
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_base_delay_ms", &self.retry_base_delay_ms)
            .finish()
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: None,
            token: None,
            request_timeout_secs: 30,
            max_retries: 3,
            retry_base_delay_ms: 1000,
        }
    }
}

impl ClassifierConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Centered rolling-mean window, shrunk to the number of days when shorter.
    pub rolling_window: usize,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self { rolling_window: 5 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.sentiment.neutral_threshold, 0.1);
        assert_eq!(config.sentiment.min_sentence_chars, 5);
        assert_eq!(config.timeline.rolling_window, 5);
        assert_eq!(config.pacing_delay(), Duration::from_secs(1));
        assert!(config.classifier.enabled);
        assert!(config.classifier.endpoint.is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "pacing_delay_ms: 250\nsentiment:\n  neutral_threshold: 0.2\n";
        let config = PipelineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.pacing_delay_ms, 250);
        assert_eq!(config.sentiment.neutral_threshold, 0.2);
        assert_eq!(config.sentiment.min_sentence_chars, 5);
        assert_eq!(config.extraction.content_min_chars, 100);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(PipelineConfig::from_yaml("  \n").unwrap(), PipelineConfig::default());
    }

    #[test]
    fn test_invalid_yaml() {
        let err = PipelineConfig::from_yaml("pacing_delay_ms: [oops").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "classifier:\n  endpoint: http://localhost:8080/classify\n  max_retries: 1").unwrap();
        let config = PipelineConfig::load(Some(file.path())).unwrap();
        assert_eq!(
            config.classifier.endpoint.as_deref(),
            Some("http://localhost:8080/classify")
        );
        assert_eq!(config.classifier.max_retries, 1);
    }

    #[test]
    fn test_load_without_path() {
        assert_eq!(PipelineConfig::load(None).unwrap(), PipelineConfig::default());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ClassifierConfig {
            token: Some("secret".to_string()),
            ..ClassifierConfig::default()
        };
        assert!(!format!("{config:?}").contains("secret"));
    }
}
