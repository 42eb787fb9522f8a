//! Turn per-sentence classifier output into one article-level record.
//!
//! Checks run in a fixed order and each one can end the analysis with an
//! unavailable record:
//!
//! | Check | Message |
//! |-------|---------|
//! | content missing or empty | [`MSG_CONTENT_UNAVAILABLE`] |
//! | segmentation yields nothing | [`MSG_NO_SENTENCES`] |
//! | every sentence is too short | [`MSG_TOO_SHORT`] |
//! | the classifier failed on every sentence | [`MSG_CLASSIFIER_FAILED`] |
//!
//! A classifier failure on one sentence only drops that sentence. Timeouts
//! and retries belong to the classifier, so a slow attempt can still be
//! retried before the sentence is given up.

use super::classifier::{Classify, Probabilities};
use super::segment::segment;
use crate::config::SentimentConfig;
use crate::error::ClassificationError;
use crate::models::{SentimentRecord, CONTENT_UNAVAILABLE};
use crate::utils::{truncate_chars, truncate_for_log};
use tracing::{debug, instrument, warn};

pub const MSG_CONTENT_UNAVAILABLE: &str = "content unavailable";
pub const MSG_NO_SENTENCES: &str = "no segmentable sentences";
pub const MSG_TOO_SHORT: &str = "no sentences long enough to score";
pub const MSG_CLASSIFIER_FAILED: &str = "classifier failed on every sentence";

/// Scores article bodies with an injected classifier.
///
/// The classifier is built once at startup and only read afterwards.
#[derive(Debug)]
pub struct SentimentAggregator<C> {
    classifier: C,
    config: SentimentConfig,
}

impl<C: Classify> SentimentAggregator<C> {
    pub fn new(classifier: C, config: SentimentConfig) -> Self {
        Self { classifier, config }
    }

    /// Analyse one article body.
    #[instrument(level = "info", skip_all, fields(chars = content.chars().count()))]
    pub async fn aggregate(&self, content: &str) -> SentimentRecord {
        if content.trim().is_empty() || content == CONTENT_UNAVAILABLE {
            return SentimentRecord::unavailable(MSG_CONTENT_UNAVAILABLE);
        }

        let segments = segment(content);
        if segments.is_empty() {
            return SentimentRecord::unavailable(MSG_NO_SENTENCES);
        }

        let min_chars = self.config.min_sentence_chars;
        let mut scorable = segments
            .iter()
            .filter(|s| s.chars().count() >= min_chars)
            .peekable();
        if scorable.peek().is_none() {
            return SentimentRecord::unavailable(MSG_TOO_SHORT);
        }

        let mut scores = Vec::new();
        let mut failures = 0usize;
        for sentence in scorable {
            match self.classify_sentence(sentence).await {
                Ok(probabilities) => scores.push(probabilities.score()),
                Err(e) => {
                    failures += 1;
                    warn!(
                        error = %e,
                        sentence = %truncate_for_log(sentence, 40),
                        "Sentence classification failed; excluding it"
                    );
                }
            }
        }

        match SentimentRecord::from_scores(&scores, self.config.neutral_threshold) {
            Some(record) => {
                debug!(
                    scored = record.total_sentences,
                    failures,
                    average = record.average_score,
                    label = %record.overall_label,
                    "Aggregated article sentiment"
                );
                record
            }
            None => SentimentRecord::unavailable(MSG_CLASSIFIER_FAILED),
        }
    }

    async fn classify_sentence(
        &self,
        sentence: &str,
    ) -> Result<Probabilities, ClassificationError> {
        let input = truncate_chars(sentence, self.config.max_input_chars);
        self.classifier.classify(input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SentimentLabel;
    use crate::sentiment::classifier::{NoopClassifier, RetryClassify};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Returns fixed probabilities per sentence; unknown sentences fail.
    #[derive(Debug, Default)]
    struct Scripted {
        table: HashMap<&'static str, Probabilities>,
        seen: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(entries: &[(&'static str, Probabilities)]) -> Self {
            Self {
                table: entries.iter().copied().collect(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Classify for Scripted {
        async fn classify(&self, text: &str) -> Result<Probabilities, ClassificationError> {
            self.seen.lock().unwrap().push(text.to_string());
            self.table
                .get(text)
                .copied()
                .ok_or(ClassificationError::Status(500))
        }
    }

    /// First call hangs, second returns 503, later calls succeed.
    #[derive(Default)]
    struct SlowThenFlaky {
        calls: AtomicUsize,
    }

    impl Classify for SlowThenFlaky {
        async fn classify(&self, _text: &str) -> Result<Probabilities, ClassificationError> {
            match self.calls.fetch_add(1, Ordering::SeqCst) {
                0 => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Err(ClassificationError::Status(503))
                }
                1 => Err(ClassificationError::Status(503)),
                _ => Ok(Probabilities::new(0.0, 0.0, 1.0)),
            }
        }
    }

    fn aggregator<C: Classify>(classifier: C) -> SentimentAggregator<C> {
        SentimentAggregator::new(classifier, SentimentConfig::default())
    }

    #[tokio::test]
    async fn test_two_sentence_scenario() {
        let classifier = Scripted::new(&[
            ("今日は天気がいい", Probabilities::new(0.05, 0.15, 0.80)),
            ("明日は雨だ", Probabilities::new(0.70, 0.20, 0.10)),
        ]);
        let record = aggregator(classifier)
            .aggregate("今日は天気がいい。明日は雨だ。")
            .await;

        assert!(record.available);
        assert!((record.average_score - 0.075).abs() < 1e-9);
        assert_eq!(record.overall_label, SentimentLabel::Neutral);
        assert_eq!(record.positive_count, 1);
        assert_eq!(record.negative_count, 1);
        assert_eq!(record.neutral_count, 0);
        assert_eq!(record.total_sentences, 2);
        assert!(record.message.is_none());
    }

    #[tokio::test]
    async fn test_empty_content() {
        let record = aggregator(NoopClassifier).aggregate("   ").await;
        assert!(!record.available);
        assert_eq!(record.message.as_deref(), Some(MSG_CONTENT_UNAVAILABLE));

        let record = aggregator(NoopClassifier).aggregate(CONTENT_UNAVAILABLE).await;
        assert_eq!(record.message.as_deref(), Some(MSG_CONTENT_UNAVAILABLE));
    }

    #[tokio::test]
    async fn test_no_segmentable_sentences() {
        let record = aggregator(NoopClassifier)
            .aggregate("<script>var a = 1;</script><nav>メニュー</nav>")
            .await;
        assert!(!record.available);
        assert_eq!(record.message.as_deref(), Some(MSG_NO_SENTENCES));
    }

    #[tokio::test]
    async fn test_all_sentences_too_short() {
        let classifier = Scripted::default();
        let agg = aggregator(classifier);
        let record = agg.aggregate("はい。いいえ。そう。").await;
        assert!(!record.available);
        assert_eq!(record.message.as_deref(), Some(MSG_TOO_SHORT));
        assert!(agg.classifier.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_sentence_is_excluded() {
        let classifier = Scripted::new(&[("景気は回復している", Probabilities::new(0.1, 0.1, 0.8))]);
        let record = aggregator(classifier)
            .aggregate("景気は回復している。この文は分類に失敗する。")
            .await;
        assert!(record.available);
        assert_eq!(record.total_sentences, 1);
        assert!((record.average_score - 0.7).abs() < 1e-9);
        assert_eq!(record.overall_label, SentimentLabel::Positive);
    }

    #[tokio::test]
    async fn test_every_sentence_failing_is_unavailable() {
        let record = aggregator(NoopClassifier)
            .aggregate("景気は回復している。物価は上昇している。")
            .await;
        assert!(!record.available);
        assert_eq!(record.message.as_deref(), Some(MSG_CLASSIFIER_FAILED));
    }

    #[tokio::test]
    async fn test_short_sentences_are_skipped_not_sent() {
        let classifier = Scripted::new(&[("物価は上昇している", Probabilities::new(0.6, 0.3, 0.1))]);
        let agg = aggregator(classifier);
        let record = agg.aggregate("はい。物価は上昇している。").await;
        assert_eq!(record.total_sentences, 1);
        assert_eq!(record.overall_label, SentimentLabel::Negative);
        assert_eq!(*agg.classifier.seen.lock().unwrap(), vec!["物価は上昇している".to_string()]);
    }

    #[tokio::test]
    async fn test_long_sentences_are_truncated_before_classification() {
        let config = SentimentConfig {
            max_input_chars: 6,
            ..SentimentConfig::default()
        };
        let classifier = Scripted::new(&[("長い長い長い", Probabilities::new(0.0, 1.0, 0.0))]);
        let agg = SentimentAggregator::new(classifier, config);
        let record = agg.aggregate("長い長い長い長い長い文。").await;
        assert!(record.available);
        assert_eq!(record.neutral_count, 1);
    }

    #[tokio::test]
    async fn test_slow_attempt_is_retried_before_dropping_sentence() {
        let classifier = RetryClassify::new(SlowThenFlaky::default(), 3, Duration::ZERO)
            .with_attempt_timeout(Duration::from_millis(100));
        let record = aggregator(classifier).aggregate("景気は回復している。").await;
        assert!(record.available);
        assert_eq!(record.positive_count, 1);
    }

    #[tokio::test]
    async fn test_classifier_timeout_drops_sentence() {
        let classifier = RetryClassify::new(SlowThenFlaky::default(), 0, Duration::ZERO)
            .with_attempt_timeout(Duration::from_millis(100));
        let record = aggregator(classifier).aggregate("景気は回復している。").await;
        assert!(!record.available);
        assert_eq!(record.message.as_deref(), Some(MSG_CLASSIFIER_FAILED));
    }

    #[tokio::test]
    async fn test_threshold_is_configurable() {
        let config = SentimentConfig {
            neutral_threshold: 0.05,
            ..SentimentConfig::default()
        };
        let classifier = Scripted::new(&[
            ("今日は天気がいい", Probabilities::new(0.05, 0.15, 0.80)),
            ("明日は雨だ", Probabilities::new(0.70, 0.20, 0.10)),
        ]);
        let record = SentimentAggregator::new(classifier, config)
            .aggregate("今日は天気がいい。明日は雨だ。")
            .await;
        assert_eq!(record.overall_label, SentimentLabel::Positive);
    }
}
