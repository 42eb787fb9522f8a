//! Discover a publisher's article URLs for one day.
//!
//! The front page is scanned for links whose path carries both the
//! publisher's article marker and the requested `YYYY-MM-DD` date, e.g.
//! `/news/articles/2025-09-23/T3A1B2`.

use super::fetch::Fetch;
use super::source::{index_rule, IndexRule};
use crate::error::RetrievalError;
use crate::models::SourceId;
use chrono::NaiveDate;
use itertools::Itertools;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

/// Fetch the front page of `source` and list its articles dated `date`.
#[instrument(level = "info", skip(fetcher))]
pub async fn index_articles<F: Fetch>(
    fetcher: &F,
    source: SourceId,
    date: NaiveDate,
) -> Result<Vec<String>, RetrievalError> {
    let rule = index_rule(source).ok_or_else(|| RetrievalError::NoIndexRule(source.to_string()))?;
    let html = fetcher.fetch(rule.front_page).await?;
    let urls = article_links(&html, &rule, date)?;

    info!(
        count = urls.len(),
        source = rule.front_page,
        %date,
        "Indexed article URLs"
    );
    debug!(urls = ?urls, "Indexed URLs");
    Ok(urls)
}

/// Absolute, de-duplicated article links in first-seen order.
pub fn article_links(
    html: &str,
    rule: &IndexRule,
    date: NaiveDate,
) -> Result<Vec<String>, RetrievalError> {
    let base = Url::parse(rule.front_page).map_err(|source| RetrievalError::InvalidUrl {
        url: rule.front_page.to_string(),
        source,
    })?;
    let date_fragment = date.format("%Y-%m-%d").to_string();
    let document = Html::parse_document(html);
    let Ok(link_selector) = Selector::parse("a[href]") else {
        return Ok(Vec::new());
    };

    let urls = document
        .select(&link_selector)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.contains(rule.article_marker) && href.contains(&date_fragment))
        .filter_map(|href| base.join(href).ok())
        .map(|u| u.to_string())
        .unique()
        .collect();
    Ok(urls)
}
