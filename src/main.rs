//! # News Sentiment
//!
//! Extracts articles from Japanese financial news sites, scores their
//! sentiment sentence by sentence, and rolls the scores up into a daily
//! timeline.
//!
//! ## Features
//!
//! - Per-publisher locator chains (Bloomberg, Reuters, Nikkei, NHK, Yahoo!
//!   News) with universal fallbacks and explicit "unknown" sentinels
//! - Boilerplate-pruned body text, split into sentences on `。`
//! - Sentence scores from a hosted text-classification endpoint, aggregated
//!   into one labelled record per article
//! - Sequential, paced batch runs over a `date,url` manifest that survive
//!   individual failures and stop cleanly on Ctrl-C
//! - Daily aggregates with a centered rolling mean, written as JSON
//!
//! ## Usage
//!
//! ```sh
//! news_sentiment discover --date 2025-09-23 -o manifest.csv
//! news_sentiment batch -m manifest.csv -o results.csv -t timeline.json
//! news_sentiment timeline -i results.csv -o timeline.json --window 7
//! news_sentiment article <url> --score
//! ```
//!
//! ## Architecture
//!
//! The batch command follows a pipeline:
//! 1. **Manifest**: read `date,url` rows, skipping unusable ones
//! 2. **Fetching**: download each page, one at a time, with a pause after each
//! 3. **Extraction**: resolve title, author, date and body
//! 4. **Scoring**: classify each sentence and aggregate per article
//! 5. **Output**: write the result CSV and, optionally, the daily timeline

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::future::Future;
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod batch;
mod cli;
mod config;
mod error;
mod manifest;
mod models;
mod outputs;
mod scrapers;
mod sentiment;
mod timeline;
mod utils;

use batch::{cancellation, BatchRunner, CancelHandle};
use cli::{ClassifierArgs, Cli, Command};
use config::PipelineConfig;
use models::SourceId;
use outputs::{csv, json};
use scrapers::extract::FieldExtractor;
use scrapers::fetch::HttpFetcher;
use sentiment::{ClassifierBackend, SentimentAggregator};
use utils::ensure_writable_parent;

/// Characters of body text shown by `article` without `--full`.
const PREVIEW_CHARS: usize = 200;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_sentiment starting up");

    let args = Cli::parse();
    debug!(?args.config, ?args.command, "Parsed CLI arguments");

    let mut config = PipelineConfig::load(args.config.as_deref())?;
    apply_classifier_args(&mut config, &args.classifier);

    match args.command {
        Command::Article { url, full, score } => {
            run_article(&config, &url, full, score).await?;
        }
        Command::Discover {
            source,
            date,
            output,
        } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            run_discover(&config, source, date, &output).await?;
        }
        Command::Batch {
            manifest,
            output,
            timeline,
            pacing_ms,
            window,
        } => {
            if let Some(ms) = pacing_ms {
                config.pacing_delay_ms = ms;
            }
            if let Some(w) = window {
                config.timeline.rolling_window = w;
            }
            run_batch(&config, &manifest, &output, timeline.as_deref()).await?;
        }
        Command::Timeline {
            input,
            output,
            window,
        } => {
            if let Some(w) = window {
                config.timeline.rolling_window = w;
            }
            run_timeline(&config, &input, &output).await?;
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

/// Command-line classifier flags take precedence over the config file.
fn apply_classifier_args(config: &mut PipelineConfig, args: &ClassifierArgs) {
    if let Some(url) = &args.sentiment_api_url {
        config.classifier.endpoint = Some(url.clone());
    }
    if let Some(token) = &args.sentiment_api_token {
        config.classifier.token = Some(token.clone());
    }
    if args.no_sentiment {
        config.classifier.enabled = false;
    }
}

fn build_runner(
    config: &PipelineConfig,
) -> Result<BatchRunner<HttpFetcher, ClassifierBackend>, Box<dyn Error>> {
    let fetcher = HttpFetcher::new(&config.user_agent, config.fetch_timeout())?;
    let classifier = ClassifierBackend::from_config(&config.classifier)?;
    debug!(scoring = classifier.is_enabled(), "Built batch runner");
    Ok(BatchRunner::new(
        fetcher,
        FieldExtractor::from_config(&config.extraction),
        SentimentAggregator::new(classifier, config.sentiment.clone()),
        config.pacing_delay(),
        config.entry_timeout(),
    ))
}

#[instrument(level = "info", skip(config))]
async fn run_article(
    config: &PipelineConfig,
    url: &str,
    full: bool,
    score: bool,
) -> Result<(), Box<dyn Error>> {
    let runner = build_runner(config)?;
    let article = if score {
        runner.inspect(url).await?
    } else {
        runner.extract(url).await?
    };
    if !article.has_content() {
        warn!(url, "No body text could be extracted");
    }
    let preview = if full { None } else { Some(PREVIEW_CHARS) };
    println!("{}", json::article_to_json(&article, preview)?);
    Ok(())
}

#[instrument(level = "info", skip(config))]
async fn run_discover(
    config: &PipelineConfig,
    source: SourceId,
    date: chrono::NaiveDate,
    output: &Path,
) -> Result<(), Box<dyn Error>> {
    ensure_writable_parent(output).await?;
    let fetcher = HttpFetcher::new(&config.user_agent, config.fetch_timeout())?;
    let urls = scrapers::index::index_articles(&fetcher, source, date).await?;
    if urls.is_empty() {
        warn!(%source, %date, "No articles found for this date");
    }

    let file = std::fs::File::create(output)?;
    manifest::write_manifest(file, date, &urls)?;
    info!(path = %output.display(), count = urls.len(), "Wrote batch manifest");
    Ok(())
}

#[instrument(level = "info", skip(config))]
async fn run_batch(
    config: &PipelineConfig,
    manifest_path: &Path,
    output: &Path,
    timeline_path: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    // Early check: fail before a long run rather than after it
    if let Err(e) = ensure_writable_parent(output).await {
        error!(
            path = %output.display(),
            error = %e,
            "Result directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    let manifest = manifest::read_manifest(manifest_path)?;
    let runner = build_runner(config)?;

    let (handle, token) = cancellation();
    tokio::spawn(async move {
        if watch_interrupts(tokio::signal::ctrl_c, handle).await {
            error!("Second interrupt received; aborting without writing results");
            std::process::exit(130);
        }
    });

    let outcome = runner.run(&manifest.entries, token).await;
    let rows = outcome.result_rows();

    info!(
        manifest_rows = manifest.entries.len() + manifest.rejected.len(),
        rejected_rows = manifest.rejected.len(),
        attempted = outcome.attempted,
        scored = rows.len(),
        unscored = outcome.rows.len() - rows.len(),
        skipped = outcome.skipped.len(),
        cancelled = outcome.cancelled,
        "Batch summary"
    );
    for skipped in &outcome.skipped {
        debug!(line = skipped.entry.line, url = %skipped.entry.url, reason = %skipped.reason, "Skipped entry");
    }

    csv::write_results(&rows, output).await?;

    if let Some(path) = timeline_path {
        let days = timeline::aggregate(&rows, config.timeline.rolling_window);
        json::write_timeline(&days, path).await?;
    }
    Ok(())
}

/// Cancel the batch on the first interrupt. Resolves `true` if a second
/// interrupt follows, `false` if signals cannot be listened for.
async fn watch_interrupts<F, Fut>(mut next_interrupt: F, handle: CancelHandle) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = next_interrupt().await {
        warn!(error = %e, "Cannot listen for Ctrl-C; batch runs to completion");
        return false;
    }
    warn!("Interrupt received; stopping after the current entry (Ctrl-C again to abort)");
    handle.cancel();
    next_interrupt().await.is_ok()
}

#[instrument(level = "info", skip(config))]
async fn run_timeline(
    config: &PipelineConfig,
    input: &Path,
    output: &Path,
) -> Result<(), Box<dyn Error>> {
    let rows = csv::read_results(input)?;
    let days = timeline::aggregate(&rows, config.timeline.rolling_window);
    json::write_timeline(&days, output).await?;
    Ok(())
}
