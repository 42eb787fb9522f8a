//! Data models for extracted articles, their sentiment, and the daily series.
//!
//! This module defines the core data structures used throughout the application:
//! - [`SourceId`]: The publisher a URL belongs to
//! - [`ExtractedFields`] / [`ArticleRecord`]: Fields resolved from one page of markup
//! - [`SentimentRecord`]: Article-level sentiment with an explicit availability flag
//! - [`BatchRow`] / [`ResultRow`]: One processed manifest entry and its tabular form
//! - [`DailyAggregate`]: Per-day sums, mean and rolling mean
//!
//! Unresolved article fields carry fixed sentinel strings rather than empty
//! values, so an empty-but-valid field is never confused with a failed lookup.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentinel title when no title locator matched.
pub const UNKNOWN_TITLE: &str = "unknown title";
/// Sentinel author when no byline locator matched.
pub const UNKNOWN_AUTHOR: &str = "unknown author";
/// Sentinel publication date when no date locator matched.
pub const UNKNOWN_DATE: &str = "unknown date";
/// Sentinel body when no content locator produced any text.
pub const CONTENT_UNAVAILABLE: &str = "content unavailable";

/// A known publisher, or [`SourceId::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    Bloomberg,
    Reuters,
    Nikkei,
    Nhk,
    YahooNews,
    Unknown,
}

impl SourceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Bloomberg => "bloomberg",
            SourceId::Reuters => "reuters",
            SourceId::Nikkei => "nikkei",
            SourceId::Nhk => "nhk",
            SourceId::YahooNews => "yahoonews",
            SourceId::Unknown => "unknown",
        }
    }
}

impl FromStr for SourceId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bloomberg" => Ok(SourceId::Bloomberg),
            "reuters" => Ok(SourceId::Reuters),
            "nikkei" => Ok(SourceId::Nikkei),
            "nhk" => Ok(SourceId::Nhk),
            "yahoonews" | "yahoo" => Ok(SourceId::YahooNews),
            other => Err(format!("unknown source {other:?}")),
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields resolved by the extractor from one document.
///
/// Each field either holds the text of the first locator that accepted it or
/// the matching sentinel constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub title: String,
    pub author: String,
    pub published_at: String,
    pub content: String,
}

/// One article as extracted from a fetched page.
///
/// Immutable once built, apart from attaching its single sentiment record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// The URL the markup was fetched from; unique within a batch.
    pub url: String,
    pub source: SourceId,
    pub title: String,
    pub author: String,
    /// Publication date text as found in the markup, or [`UNKNOWN_DATE`].
    pub published_at: String,
    pub content: String,
    pub sentiment: Option<SentimentRecord>,
}

impl ArticleRecord {
    pub fn new(url: impl Into<String>, source: SourceId, fields: ExtractedFields) -> Self {
        Self {
            url: url.into(),
            source,
            title: fields.title,
            author: fields.author,
            published_at: fields.published_at,
            content: fields.content,
            sentiment: None,
        }
    }

    pub fn has_content(&self) -> bool {
        self.content != CONTENT_UNAVAILABLE
    }

    pub fn with_sentiment(mut self, sentiment: SentimentRecord) -> Self {
        self.sentiment = Some(sentiment);
        self
    }
}

/// Three-way sentiment label shared by sentences and articles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// Bucket a score with a symmetric neutral band of `±threshold`.
    ///
    /// Scores strictly above `threshold` are positive, strictly below
    /// `-threshold` negative, everything else neutral.
    pub fn from_score(score: f64, threshold: f64) -> Self {
        if score > threshold {
            SentimentLabel::Positive
        } else if score < -threshold {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        })
    }
}

/// Article-level sentiment.
///
/// When `available` is `false` only `message` is meaningful; the score and
/// counts are zeroed and must not be consulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub available: bool,
    pub average_score: f64,
    pub overall_label: SentimentLabel,
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
    pub total_sentences: usize,
    pub message: Option<String>,
}

impl SentimentRecord {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            available: false,
            average_score: 0.0,
            overall_label: SentimentLabel::Neutral,
            positive_count: 0,
            negative_count: 0,
            neutral_count: 0,
            total_sentences: 0,
            message: Some(message.into()),
        }
    }

    /// Build an available record from per-sentence scores.
    ///
    /// Returns `None` for an empty slice: there is nothing to average.
    pub fn from_scores(scores: &[f64], threshold: f64) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }
        let mut positive_count = 0;
        let mut negative_count = 0;
        let mut neutral_count = 0;
        for &score in scores {
            match SentimentLabel::from_score(score, threshold) {
                SentimentLabel::Positive => positive_count += 1,
                SentimentLabel::Negative => negative_count += 1,
                SentimentLabel::Neutral => neutral_count += 1,
            }
        }
        let average_score = scores.iter().sum::<f64>() / scores.len() as f64;
        Some(Self {
            available: true,
            average_score,
            overall_label: SentimentLabel::from_score(average_score, threshold),
            positive_count,
            negative_count,
            neutral_count,
            total_sentences: scores.len(),
            message: None,
        })
    }
}

/// One processed manifest entry.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRow {
    /// Date key taken from the manifest, not from the article markup.
    pub date: NaiveDate,
    pub article: ArticleRecord,
}

impl BatchRow {
    /// Tabular projection of the row, present only when sentiment was scored.
    pub fn result_row(&self) -> Option<ResultRow> {
        let sentiment = self.article.sentiment.as_ref().filter(|s| s.available)?;
        Some(ResultRow {
            date: self.date,
            url: self.article.url.clone(),
            title: self.article.title.clone(),
            sentiment_score: sentiment.average_score,
            overall_sentiment: sentiment.overall_label,
            positive_count: sentiment.positive_count,
            negative_count: sentiment.negative_count,
            neutral_count: sentiment.neutral_count,
            total_sentences: sentiment.total_sentences,
        })
    }
}

/// A row of the batch output table.
///
/// Field order is the column order of the written CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub date: NaiveDate,
    pub url: String,
    pub title: String,
    pub sentiment_score: f64,
    pub overall_sentiment: SentimentLabel,
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
    pub total_sentences: usize,
}

/// Sentiment totals for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub article_count: usize,
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
    pub mean_score: f64,
    /// Centered rolling mean of `mean_score`; `None` where the window does
    /// not fit inside the series.
    pub rolling_mean_score: Option<f64>,
}
