//! Minimal markdown-to-HTML formatting for assistant replies.
//!
//! Renderers recompute this from the full accumulated text on every chunk,
//! so it has to stay cheap: HTML escaping plus a handful of regex
//! substitutions (fenced code blocks, inline code, bold, line breaks).

use regex::Regex;
use std::sync::LazyLock;

static CODE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(\w+)?\n([\s\S]*?)```").unwrap());
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());
static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());

/// Escape the characters HTML treats specially
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Format assistant text as HTML
pub fn format_markdown(text: &str) -> String {
    let html = escape_html(text);
    let html = CODE_BLOCK.replace_all(&html, "<pre><code>${2}</code></pre>");
    let html = INLINE_CODE.replace_all(&html, "<code>${1}</code>");
    let html = BOLD.replace_all(&html, "<strong>${1}</strong>");
    html.replace('\n', "<br>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_html() {
        assert_eq!(format_markdown("a < b & c > d"), "a &lt; b &amp; c &gt; d");
    }

    #[test]
    fn test_bold() {
        assert_eq!(format_markdown("**hi** there"), "<strong>hi</strong> there");
    }

    #[test]
    fn test_inline_code() {
        assert_eq!(
            format_markdown("run `cargo doc` now"),
            "run <code>cargo doc</code> now"
        );
    }

    #[test]
    fn test_code_block_with_language_tag() {
        assert_eq!(
            format_markdown("```rust\nlet x = 1;\n```"),
            "<pre><code>let x = 1;<br></code></pre>"
        );
    }

    #[test]
    fn test_line_breaks() {
        assert_eq!(format_markdown("one\ntwo"), "one<br>two");
    }

    #[test]
    fn test_markup_inside_code_is_escaped() {
        assert_eq!(
            format_markdown("`<script>`"),
            "<code>&lt;script&gt;</code>"
        );
    }
}
