//! The batch result table.
//!
//! One row per scored article, in manifest order, with the columns
//! `date,url,title,sentiment_score,overall_sentiment,positive_count,
//! negative_count,neutral_count,total_sentences`. Articles whose sentiment
//! was unavailable are not written.

use crate::error::PipelineError;
use crate::models::ResultRow;
use crate::utils::ensure_writable_parent;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Serialize rows to CSV bytes, header first.
pub fn to_csv(rows: &[ResultRow]) -> Result<Vec<u8>, PipelineError> {
    let mut writer = ::csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(Vec::new());
    if rows.is_empty() {
        writer.write_record(HEADER)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| PipelineError::Io(e.into_error()))
}

/// Column names, used for the header of an empty table.
pub const HEADER: [&str; 9] = [
    "date",
    "url",
    "title",
    "sentiment_score",
    "overall_sentiment",
    "positive_count",
    "negative_count",
    "neutral_count",
    "total_sentences",
];

/// Write the result table to `path`.
#[instrument(level = "info", skip_all, fields(path = %path.display(), rows = rows.len()))]
pub async fn write_results(rows: &[ResultRow], path: &Path) -> Result<(), PipelineError> {
    if let Err(e) = ensure_writable_parent(path).await {
        error!(error = %e, "Output directory is not writable");
        return Err(e.into());
    }
    let bytes = to_csv(rows)?;
    fs::write(path, bytes).await?;
    info!("Wrote result table");
    Ok(())
}

/// Read a result table written by [`write_results`].
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn read_results(path: &Path) -> Result<Vec<ResultRow>, PipelineError> {
    let mut reader = ::csv::Reader::from_path(path)?;
    let rows = reader
        .deserialize::<ResultRow>()
        .collect::<Result<Vec<_>, _>>()?;
    info!(rows = rows.len(), "Read result table");
    Ok(rows)
}
