//! Sentence-level sentiment scoring.
//!
//! - [`segment`]: split article bodies into sentences
//! - [`classifier`]: the black-box sentence classifier and its backends
//! - [`aggregate`]: combine sentence scores into one article record
//!
//! A sentence scores `P(positive) - P(negative)`. Sentences and articles are
//! bucketed with the same neutral band (`±0.1` unless configured otherwise),
//! so an article's label and its dominant sentence bucket agree.

pub mod aggregate;
pub mod classifier;
pub mod segment;

pub use aggregate::SentimentAggregator;
pub use classifier::{ClassifierBackend, Classify};
