//! Split article bodies into sentences for the classifier.
//!
//! Sentences end at the ideographic full stop (`。`). Content that still
//! carries markup is first reduced to plain text: boilerplate subtrees are
//! pruned, and only Japanese script, ASCII word characters and
//! sentence punctuation survive.

use crate::utils::{collapse_whitespace, pruned_text};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use std::borrow::Cow;

/// Sentence terminator.
pub const FULL_STOP: char = '。';

static MARKUP_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?[A-Za-z!][^>]*>").expect("MARKUP_TAG regex"));

static NOISE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\p{Hiragana}\p{Katakana}\p{Han}ー々〆、。！？A-Za-z0-9_.!?\s]+")
        .expect("NOISE regex")
});

/// Sentences of one body of text.
///
/// Iteration is lazy and can be restarted any number of times via
/// [`Segments::iter`].
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    text: Cow<'a, str>,
}

impl<'a> Segments<'a> {
    /// Trimmed, non-empty sentences in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.text
            .split(FULL_STOP)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl<'s, 'a> IntoIterator for &'s Segments<'a> {
    type Item = &'s str;
    type IntoIter = Box<dyn Iterator<Item = &'s str> + 's>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Segment `content` into sentences.
///
/// Whitespace-only or boilerplate-only input yields no sentences.
pub fn segment(content: &str) -> Segments<'_> {
    let text = if MARKUP_TAG.is_match(content) {
        Cow::Owned(markup_to_text(content))
    } else {
        Cow::Borrowed(content)
    };
    Segments { text }
}

/// Plain text of a markup fragment, cleaned for classification.
pub fn markup_to_text(markup: &str) -> String {
    let fragment = Html::parse_fragment(markup);
    let text = pruned_text(fragment.root_element());
    collapse_whitespace(&NOISE.replace_all(&text, " "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_full_stop() {
        let segments = segment("今日は天気がいい。明日は雨だ。");
        let sentences: Vec<_> = segments.iter().collect();
        assert_eq!(sentences, vec!["今日は天気がいい", "明日は雨だ"]);
    }

    #[test]
    fn test_trims_and_drops_empty_segments() {
        let segments = segment("  一文目。\n。。  二文目  。  ");
        let sentences: Vec<_> = segments.iter().collect();
        assert_eq!(sentences, vec!["一文目", "二文目"]);
    }

    #[test]
    fn test_trailing_text_without_full_stop_is_a_sentence() {
        let segments = segment("終わりのない文");
        assert_eq!(segments.iter().collect::<Vec<_>>(), vec!["終わりのない文"]);
    }

    #[test]
    fn test_whitespace_only_is_empty() {
        assert!(segment("   \n\t\u{3000}").is_empty());
        assert!(segment("").is_empty());
    }

    #[test]
    fn test_markup_is_stripped_before_splitting() {
        let segments = segment(
            "<div><script>alert('x。')</script><p>今日は天気がいい。</p><p>明日は★雨だ。</p></div>",
        );
        let sentences: Vec<_> = segments.iter().collect();
        assert_eq!(sentences, vec!["今日は天気がいい", "明日は 雨だ"]);
    }

    #[test]
    fn test_boilerplate_only_markup_is_empty() {
        let segments = segment("<nav>ホーム。ニュース。</nav><style>p { color: red; }</style>");
        assert!(segments.is_empty());
    }

    #[test]
    fn test_iteration_is_restartable() {
        let segments = segment("一。二。三。");
        assert_eq!(segments.iter().count(), 3);
        assert_eq!(segments.iter().count(), 3);
        assert_eq!((&segments).into_iter().collect::<Vec<_>>(), vec!["一", "二", "三"]);
    }

    #[test]
    fn test_adjacent_paragraphs_do_not_fuse() {
        assert_eq!(markup_to_text("<p>見出し</p><p>本文です。</p>"), "見出し 本文です。");
        let segments = segment("<h2>景気</h2><p>回復が続く。</p>");
        assert_eq!(segments.iter().collect::<Vec<_>>(), vec!["景気 回復が続く"]);
    }

    #[test]
    fn test_markup_to_text_keeps_ascii_words() {
        assert_eq!(markup_to_text("<p>GDP は 2.5% 成長！</p>"), "GDP は 2.5 成長！");
    }
}
