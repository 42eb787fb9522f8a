//! JSON output for the daily timeline and single-article inspection.
//!
//! The timeline is a pretty-printed array of daily aggregates, oldest day
//! first. Days without a full rolling window carry `"rolling_mean_score": null`.

use crate::error::PipelineError;
use crate::models::{ArticleRecord, DailyAggregate};
use crate::utils::{ensure_writable_parent, truncate_chars};
use serde::Serialize;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write the daily series to `path`.
#[instrument(level = "info", skip_all, fields(path = %path.display(), days = days.len()))]
pub async fn write_timeline(days: &[DailyAggregate], path: &Path) -> Result<(), PipelineError> {
    write_pretty(days, path).await?;
    info!("Wrote timeline JSON");
    Ok(())
}

/// Render one inspected article, optionally clipping its body for display.
pub fn article_to_json(
    article: &ArticleRecord,
    preview_chars: Option<usize>,
) -> Result<String, PipelineError> {
    let mut article = article.clone();
    if let Some(max) = preview_chars {
        let clipped = truncate_chars(&article.content, max);
        if clipped.len() < article.content.len() {
            article.content = format!("{clipped}…");
        }
    }
    Ok(serde_json::to_string_pretty(&article)?)
}

async fn write_pretty<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), PipelineError> {
    if let Err(e) = ensure_writable_parent(path).await {
        error!(path = %path.display(), error = %e, "Output directory is not writable");
        return Err(e.into());
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).await?;
    Ok(())
}
