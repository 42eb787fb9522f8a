//! Command-line interface definitions for News Sentiment.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Classifier settings can also be provided via environment variables.

use crate::models::SourceId;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the News Sentiment application.
///
/// # Examples
///
/// ```sh
/// # Discover today's Bloomberg articles into a manifest
/// news_sentiment discover --date 2025-09-23 --output manifest.csv
///
/// # Score every article in a manifest and build the timeline
/// news_sentiment batch --manifest manifest.csv --output results.csv --timeline timeline.json
///
/// # Inspect a single article
/// news_sentiment article https://www.bloomberg.co.jp/news/articles/2025-09-23/XXXX --score
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub classifier: ClassifierArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Overrides for the sentence classifier.
#[derive(Args, Debug, Default)]
pub struct ClassifierArgs {
    /// Text-classification endpoint
    #[arg(long, global = true, env = "SENTIMENT_API_URL")]
    pub sentiment_api_url: Option<String>,

    /// Bearer token for the classification endpoint
    #[arg(long, global = true, env = "SENTIMENT_API_TOKEN", hide_env_values = true)]
    pub sentiment_api_token: Option<String>,

    /// Skip sentiment scoring entirely
    #[arg(long, global = true)]
    pub no_sentiment: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch one article and print its extracted fields
    Article {
        url: String,

        /// Print the whole body instead of a preview
        #[arg(long)]
        full: bool,

        /// Also score the body
        #[arg(long)]
        score: bool,
    },

    /// Write a manifest of a publisher's articles for one date
    Discover {
        /// Publisher to index
        #[arg(long, default_value = "bloomberg")]
        source: SourceId,

        /// Date to collect, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Manifest CSV to write
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Score every article listed in a manifest
    Batch {
        /// Manifest CSV with `date` and `url` columns
        #[arg(short, long)]
        manifest: PathBuf,

        /// Result CSV to write
        #[arg(short, long)]
        output: PathBuf,

        /// Also write the daily timeline JSON here
        #[arg(short, long)]
        timeline: Option<PathBuf>,

        /// Pause between entries in milliseconds
        #[arg(long)]
        pacing_ms: Option<u64>,

        /// Rolling-mean window in days
        #[arg(long)]
        window: Option<usize>,
    },

    /// Rebuild the daily timeline from a result CSV
    Timeline {
        /// Result CSV written by `batch`
        #[arg(short, long)]
        input: PathBuf,

        /// Timeline JSON to write
        #[arg(short, long)]
        output: PathBuf,

        /// Rolling-mean window in days
        #[arg(long)]
        window: Option<usize>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_parsing() {
        let cli = Cli::parse_from([
            "news_sentiment",
            "--config",
            "pipeline.yaml",
            "batch",
            "--manifest",
            "manifest.csv",
            "-o",
            "results.csv",
            "--timeline",
            "timeline.json",
            "--pacing-ms",
            "250",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("pipeline.yaml")));
        match cli.command {
            Command::Batch {
                manifest,
                output,
                timeline,
                pacing_ms,
                window,
            } => {
                assert_eq!(manifest, PathBuf::from("manifest.csv"));
                assert_eq!(output, PathBuf::from("results.csv"));
                assert_eq!(timeline, Some(PathBuf::from("timeline.json")));
                assert_eq!(pacing_ms, Some(250));
                assert_eq!(window, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_article_flags() {
        let cli = Cli::parse_from([
            "news_sentiment",
            "article",
            "https://jp.reuters.com/markets/a",
            "--full",
            "--no-sentiment",
        ]);
        assert!(cli.classifier.no_sentiment);
        match cli.command {
            Command::Article { url, full, score } => {
                assert_eq!(url, "https://jp.reuters.com/markets/a");
                assert!(full);
                assert!(!score);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_discover_parses_date() {
        let cli = Cli::parse_from([
            "news_sentiment",
            "discover",
            "--date",
            "2025-09-23",
            "-o",
            "manifest.csv",
        ]);
        match cli.command {
            Command::Discover { source, date, output } => {
                assert_eq!(source, SourceId::Bloomberg);
                assert_eq!(date, NaiveDate::from_ymd_opt(2025, 9, 23));
                assert_eq!(output, PathBuf::from("manifest.csv"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_discover_rejects_bad_date() {
        let result = Cli::try_parse_from([
            "news_sentiment",
            "discover",
            "--date",
            "23/09/2025",
            "-o",
            "manifest.csv",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_timeline_parsing() {
        let cli = Cli::parse_from([
            "news_sentiment",
            "timeline",
            "-i",
            "results.csv",
            "-o",
            "timeline.json",
            "--window",
            "7",
        ]);
        assert!(matches!(
            cli.command,
            Command::Timeline { window: Some(7), .. }
        ));
    }
}
