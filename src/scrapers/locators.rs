//! Declarative fallback chains for article fields.
//!
//! Every publisher gets an ordered list of [`Locator`]s per field. The
//! extractor walks the publisher's list first and then the universal list
//! that applies to every page. Adding a site means adding rows here, not
//! branches in the extractor.
//!
//! | Field   | Universal fallback                                              |
//! |---------|-----------------------------------------------------------------|
//! | title   | first `<h1>`                                                    |
//! | author  | `rel=author`, byline classes, `<meta name="author">`            |
//! | date    | first `<time>`, then any `datetime` attribute                   |
//! | content | `<article>`, `<main>`, common body containers, pooled `<p>` text |

use crate::models::SourceId;

/// A rule naming one candidate region of markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    /// Text of the first element matching the selector.
    Text(&'static str),
    /// Attribute value of the first matching element that carries it.
    Attr(&'static str, &'static str),
    /// Paragraph text under the first element matching the selector.
    Paragraphs(&'static str),
    /// Every paragraph in the document longer than the configured minimum.
    PooledParagraphs,
}

/// Which article field a chain resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Author,
    Date,
    Content,
}

/// Ordered locators for each field.
#[derive(Debug, Clone, Copy)]
pub struct FieldChains {
    pub title: &'static [Locator],
    pub author: &'static [Locator],
    pub date: &'static [Locator],
    pub content: &'static [Locator],
}

impl FieldChains {
    pub fn get(&self, field: Field) -> &'static [Locator] {
        match field {
            Field::Title => self.title,
            Field::Author => self.author,
            Field::Date => self.date,
            Field::Content => self.content,
        }
    }
}

use Locator::{Attr, Paragraphs, PooledParagraphs, Text};

const EMPTY: FieldChains = FieldChains {
    title: &[],
    author: &[],
    date: &[],
    content: &[],
};

const UNIVERSAL: FieldChains = FieldChains {
    title: &[Text("h1")],
    author: &[
        Text("[rel=author]"),
        Text(".byline"),
        Text(".author"),
        Attr("meta[name=author]", "content"),
    ],
    date: &[Text("time"), Attr("[datetime]", "datetime")],
    content: &[
        Paragraphs("article"),
        Paragraphs("main"),
        Paragraphs("[itemprop=articleBody]"),
        Paragraphs(".article-body"),
        Paragraphs(".entry-content"),
        Paragraphs("#content"),
        PooledParagraphs,
    ],
};

const BLOOMBERG: FieldChains = FieldChains {
    title: &[Text("h1[class*=headline]"), Text("h1.lede-text-v2__hed")],
    author: &[
        Text("span.byline__name"),
        Text("a.author-link"),
        Text("[class*=byline] [class*=author]"),
    ],
    date: &[
        Text("time[itemprop=datePublished]"),
        Text("time"),
        Text("span[class*=date]"),
    ],
    content: &[
        Paragraphs("div.body-copy"),
        Paragraphs("div.body-copy-v2"),
        Paragraphs("div[class*=body-content]"),
    ],
};

const REUTERS: FieldChains = FieldChains {
    title: &[Text("h1[data-testid=Heading]")],
    author: &[Text("a[rel=author]"), Text("[class*=author-name]")],
    date: &[Text("time[data-testid=Body]"), Text("[class*=date-line]")],
    content: &[
        Paragraphs("div[class*=article-body]"),
        Paragraphs("[data-testid=ArticleBody]"),
    ],
};

const NIKKEI: FieldChains = FieldChains {
    title: &[Text("h1[class*=title]")],
    author: &[Text("[class*=author]")],
    date: &[Text("time[class*=timeStamp]"), Attr("time", "datetime")],
    content: &[
        Paragraphs("section[class*=container]"),
        Paragraphs("div.cmn-article_text"),
    ],
};

const NHK: FieldChains = FieldChains {
    title: &[Text(".content--title"), Text("h1.module--title")],
    author: &[],
    date: &[Text(".content--date time"), Text(".content--date")],
    content: &[
        Paragraphs("#news_textbody"),
        Paragraphs(".content--detail-body"),
        Paragraphs(".content--summary-more"),
    ],
};

const YAHOO_NEWS: FieldChains = FieldChains {
    title: &[Text("article header h1")],
    author: &[Text("[class*=byline]"), Text("a[data-ual-view-type=media]")],
    date: &[Text("article header time")],
    content: &[
        Paragraphs(".article_body"),
        Paragraphs("[class*=articleBody]"),
    ],
};

/// Publisher-specific chains; empty for unknown sources.
pub fn source_chains(source: SourceId) -> FieldChains {
    match source {
        SourceId::Bloomberg => BLOOMBERG,
        SourceId::Reuters => REUTERS,
        SourceId::Nikkei => NIKKEI,
        SourceId::Nhk => NHK,
        SourceId::YahooNews => YAHOO_NEWS,
        SourceId::Unknown => EMPTY,
    }
}

/// Full fallback chain for one field: publisher rules, then universal rules.
pub fn chain(source: SourceId, field: Field) -> impl Iterator<Item = &'static Locator> {
    source_chains(source)
        .get(field)
        .iter()
        .chain(UNIVERSAL.get(field).iter())
}
