//! Resolve title, author, date and body from parsed article markup.
//!
//! Each field walks its fallback chain from [`locators`](super::locators)
//! and keeps the first acceptable candidate. A chain that runs dry is not an
//! error: the field takes its sentinel value and extraction carries on.
//!
//! Body text is read paragraph by paragraph. Boilerplate subtrees (scripts,
//! navigation, headers, footers, asides and the like) are skipped while
//! walking the tree, so their text never reaches sentence segmentation.

use super::locators::{self, Field, Locator};
use crate::config::ExtractionConfig;
use crate::models::{
    ExtractedFields, SourceId, CONTENT_UNAVAILABLE, UNKNOWN_AUTHOR, UNKNOWN_DATE, UNKNOWN_TITLE,
};
use crate::utils::{is_pruned, pruned_text};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

/// Evaluates locator chains against a document.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    /// Pooled body text must be longer than this to be accepted outright.
    content_min_chars: usize,
    /// Paragraphs pooled from the whole page must be longer than this.
    pooled_paragraph_min_chars: usize,
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

impl FieldExtractor {
    pub fn new(content_min_chars: usize, pooled_paragraph_min_chars: usize) -> Self {
        Self {
            content_min_chars,
            pooled_paragraph_min_chars,
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(config.content_min_chars, config.pooled_paragraph_min_chars)
    }

    /// Parse raw markup and extract from it.
    pub fn extract_markup(&self, markup: &str, source: SourceId) -> ExtractedFields {
        let document = Html::parse_document(markup);
        self.extract(&document, source)
    }

    /// Resolve every field of `document` using the chains for `source`.
    pub fn extract(&self, document: &Html, source: SourceId) -> ExtractedFields {
        let title = self.resolve_text(document, source, Field::Title);
        let author = self.resolve_text(document, source, Field::Author);
        let published_at = self.resolve_text(document, source, Field::Date);
        let content = self.resolve_content(document, source);

        debug!(
            %source,
            title_found = title.is_some(),
            author_found = author.is_some(),
            date_found = published_at.is_some(),
            content_chars = content.as_ref().map(|c| c.chars().count()).unwrap_or(0),
            "Resolved article fields"
        );

        ExtractedFields {
            title: title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            author: author.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            published_at: published_at.unwrap_or_else(|| UNKNOWN_DATE.to_string()),
            content: content.unwrap_or_else(|| CONTENT_UNAVAILABLE.to_string()),
        }
    }

    /// First non-empty candidate wins.
    fn resolve_text(&self, document: &Html, source: SourceId, field: Field) -> Option<String> {
        locators::chain(source, field)
            .find_map(|locator| self.evaluate(document, locator).filter(|t| !t.is_empty()))
    }

    /// First candidate longer than `content_min_chars` wins; otherwise the
    /// longest non-empty candidate seen along the chain.
    fn resolve_content(&self, document: &Html, source: SourceId) -> Option<String> {
        let mut best: Option<(usize, String)> = None;
        for locator in locators::chain(source, Field::Content) {
            let Some(text) = self.evaluate(document, locator) else {
                continue;
            };
            let chars = text.chars().count();
            if chars == 0 {
                continue;
            }
            if chars > self.content_min_chars {
                return Some(text);
            }
            if best.as_ref().is_none_or(|(len, _)| chars > *len) {
                best = Some((chars, text));
            }
        }
        best.map(|(_, text)| text)
    }

    fn evaluate(&self, document: &Html, locator: &Locator) -> Option<String> {
        match *locator {
            Locator::Text(css) => document.select(&selector(css)?).next().map(pruned_text),
            Locator::Attr(css, attr) => document
                .select(&selector(css)?)
                .filter_map(|el| el.value().attr(attr))
                .map(|v| v.trim().to_string())
                .find(|v| !v.is_empty()),
            Locator::Paragraphs(css) => {
                let container = document.select(&selector(css)?).next()?;
                let mut paragraphs = Vec::new();
                collect_paragraphs(container, 0, &mut paragraphs);
                join_paragraphs(paragraphs)
            }
            Locator::PooledParagraphs => {
                let mut paragraphs = Vec::new();
                collect_paragraphs(
                    document.root_element(),
                    self.pooled_paragraph_min_chars,
                    &mut paragraphs,
                );
                join_paragraphs(paragraphs)
            }
        }
    }
}

fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(s) => Some(s),
        Err(e) => {
            warn!(css, error = %e, "Skipping unparseable locator");
            None
        }
    }
}

/// Gather `<p>` text under `element`, never descending into pruned subtrees.
fn collect_paragraphs(element: ElementRef<'_>, min_chars: usize, out: &mut Vec<String>) {
    for child in element.children() {
        let Some(child_el) = ElementRef::wrap(child) else {
            continue;
        };
        let name = child_el.value().name();
        if is_pruned(name) {
            continue;
        }
        if name == "p" {
            let text = pruned_text(child_el);
            if !text.is_empty() && text.chars().count() > min_chars {
                out.push(text);
            }
        } else {
            collect_paragraphs(child_el, min_chars, out);
        }
    }
}

fn join_paragraphs(paragraphs: Vec<String>) -> Option<String> {
    if paragraphs.is_empty() {
        None
    } else {
        Some(paragraphs.join("\n"))
    }
}
