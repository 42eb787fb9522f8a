//! Map article URLs to known publishers.
//!
//! Classification is a substring match of the URL host against a fixed
//! table. It never fails: anything unmatched, including unparseable input,
//! is [`SourceId::Unknown`].

use crate::models::SourceId;
use url::Url;

/// Host fragments checked in order; the first contained in the host wins.
const HOST_TABLE: &[(&str, SourceId)] = &[
    ("bloomberg.co.jp", SourceId::Bloomberg),
    ("bloomberg.com", SourceId::Bloomberg),
    ("reuters.com", SourceId::Reuters),
    ("nikkei.com", SourceId::Nikkei),
    ("nhk.or.jp", SourceId::Nhk),
    ("news.yahoo.co.jp", SourceId::YahooNews),
];

/// How to find a publisher's articles for a given day on its front page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRule {
    /// Front page listing recent articles.
    pub front_page: &'static str,
    /// Path fragment every article link contains.
    pub article_marker: &'static str,
}

/// Classify a URL by its host.
pub fn classify(url: &str) -> SourceId {
    let host = match Url::parse(url.trim()) {
        Ok(parsed) => match parsed.host_str() {
            Some(h) => h.to_ascii_lowercase(),
            None => return SourceId::Unknown,
        },
        Err(_) => return SourceId::Unknown,
    };

    HOST_TABLE
        .iter()
        .find(|(fragment, _)| host.contains(fragment))
        .map(|(_, id)| *id)
        .unwrap_or(SourceId::Unknown)
}

/// Front-page index rule for sources that date their article paths.
pub fn index_rule(source: SourceId) -> Option<IndexRule> {
    match source {
        SourceId::Bloomberg => Some(IndexRule {
            front_page: "https://www.bloomberg.co.jp/",
            article_marker: "/news/articles/",
        }),
        _ => None,
    }
}
