//! Utility functions for text cleanup, truncation, and output directories.
//!
//! This module provides helper functions used throughout the application:
//! - Markup-to-text conversion that prunes boilerplate subtrees first
//! - Whitespace collapsing and character-safe truncation
//! - File system validation for output paths

use scraper::ElementRef;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Elements whose whole subtree is dropped before any text is read.
const PRUNED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "nav", "header", "footer", "aside", "form",
    "iframe", "svg", "button",
];

/// Elements whose text must not run into a neighbour's.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "section",
    "article", "main", "blockquote", "pre", "table", "tr", "td", "th", "dd", "dt", "figcaption",
];

/// `true` for elements that never contribute article text.
pub fn is_pruned(tag: &str) -> bool {
    PRUNED_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

fn is_block(tag: &str) -> bool {
    BLOCK_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

/// Text under `element` with pruned subtrees skipped and whitespace collapsed.
///
/// Block elements are separated by a space so adjacent paragraphs never fuse.
pub fn pruned_text(element: ElementRef<'_>) -> String {
    fn append_text(element: ElementRef<'_>, out: &mut String) {
        for child in element.children() {
            if let Some(text) = child.value().as_text() {
                out.push_str(text);
            } else if let Some(child_el) = ElementRef::wrap(child) {
                let name = child_el.value().name();
                if is_pruned(name) {
                    continue;
                }
                let block = is_block(name);
                if block {
                    out.push(' ');
                }
                append_text(child_el, out);
                if block {
                    out.push(' ');
                }
            }
        }
    }

    let mut buffer = String::new();
    append_text(element, &mut buffer);
    collapse_whitespace(&buffer)
}

/// Collapse runs of whitespace (including ideographic spaces) to one space.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep at most `max` characters of `s`.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and a count of
/// the dropped bytes appended. Cuts always land on a character boundary.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let kept = truncate_chars(s, max);
    if kept.len() == s.len() {
        s.to_string()
    } else {
        format!("{}…(+{} bytes)", kept, s.len() - kept.len())
    }
}

/// Ensure the parent directory of `path` exists and is writable.
///
/// Creates the directory if needed, then creates and removes a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_parent(path: &Path) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    fs::create_dir_all(&dir).await?;
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = dir.join("..__probe_write__");
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!(dir = %dir.display(), "Output directory is writable");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte() {
        let s = "日本語のテキスト";
        assert_eq!(truncate_for_log(s, 3), "日本語…(+15 bytes)");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("今日は天気", 2), "今日");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 0), "");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b\u{3000}c  "), "a b c");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn test_pruned_text_skips_boilerplate() {
        let doc = Html::parse_fragment(
            "<div><p>本文です。</p><script>var x = 1;</script><nav>メニュー</nav><p>続き。</p></div>",
        );
        let root = doc.root_element();
        let text = pruned_text(root);
        assert!(text.contains("本文です。"));
        assert!(text.contains("続き。"));
        assert!(!text.contains("var x"));
        assert!(!text.contains("メニュー"));
    }

    #[test]
    fn test_pruned_text_separates_blocks() {
        let doc = Html::parse_fragment("<div><p>見出し</p><p>本文です。</p><br>続き<b>太字</b></div>");
        assert_eq!(pruned_text(doc.root_element()), "見出し 本文です。 続き太字");
    }

    #[test]
    fn test_is_pruned() {
        assert!(is_pruned("script"));
        assert!(is_pruned("FOOTER"));
        assert!(!is_pruned("p"));
    }

    #[tokio::test]
    async fn test_ensure_writable_parent_creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("nested").join("out.csv");
        ensure_writable_parent(&target).await.unwrap();
        assert!(tmp.path().join("nested").is_dir());
    }
}
