//! Live preview markup for note text.
//!
//! Six inline constructs are recognised:
//!
//! | Syntax     | Style       |
//! |------------|-------------|
//! | `$$text$$` | title       |
//! | `$text$`   | subtitle    |
//! | `[text]`   | monospace   |
//! | `**text**` | bold        |
//! | `*text*`   | italic      |
//! | `_text_`   | underline   |
//!
//! The input is HTML-escaped first. Each match keeps its markers visible, wrapped in
//! `markdown-syntax` spans, with the enclosed text in a `markdown-<style>` span. Title and bold
//! stay within one line; the single-delimiter constructs may span line breaks.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Marker strings, each stood in for by a private-use character while later passes run, so
/// that markers emitted by one pass are never matched by the next.
const MARKERS: [(char, &str); 7] = [
    ('\u{E000}', "$$"),
    ('\u{E001}', "$"),
    ('\u{E002}', "["),
    ('\u{E003}', "]"),
    ('\u{E004}', "**"),
    ('\u{E005}', "*"),
    ('\u{E006}', "_"),
];

struct Construct {
    class: &'static str,
    pattern: Regex,
    open: char,
    close: char,
}

static CONSTRUCTS: LazyLock<Vec<Construct>> = LazyLock::new(|| {
    // Order matters: `$$` before `$`, `**` before `*`.
    let table: [(&str, &str, char, char); 6] = [
        ("title", r"\$\$(.*?)\$\$", '\u{E000}', '\u{E000}'),
        ("subtitle", r"\$([^$]+?)\$", '\u{E001}', '\u{E001}'),
        ("monospace", r"\[([^\]]+?)\]", '\u{E002}', '\u{E003}'),
        ("bold", r"\*\*(.*?)\*\*", '\u{E004}', '\u{E004}'),
        ("italic", r"\*([^*]+?)\*", '\u{E005}', '\u{E005}'),
        ("underline", r"_([^_]+?)_", '\u{E006}', '\u{E006}'),
    ];
    table
        .into_iter()
        .map(|(class, pattern, open, close)| Construct {
            class,
            pattern: Regex::new(pattern).expect("preview patterns are valid"),
            open,
            close,
        })
        .collect()
});

/// Renders note text as escaped, styled HTML.
pub fn render(text: &str) -> String {
    let mut html = escape_html(text);
    for construct in CONSTRUCTS.iter() {
        html = construct
            .pattern
            .replace_all(&html, |caps: &Captures| {
                format!(
                    "<span class=\"markdown-syntax\">{open}</span><span class=\"markdown-{class}\">{inner}</span><span class=\"markdown-syntax\">{close}</span>",
                    open = construct.open,
                    class = construct.class,
                    inner = &caps[1],
                    close = construct.close,
                )
            })
            .into_owned();
    }
    restore_markers(&html)
}

/// Escapes HTML special characters. Marker stand-ins in the input are escaped too, so they
/// come out as themselves rather than as markers.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c if is_marker(c) => escaped.push_str(&format!("&#x{:X};", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}

fn is_marker(c: char) -> bool {
    MARKERS.iter().any(|(marker, _)| *marker == c)
}

fn restore_markers(html: &str) -> String {
    let mut restored = String::with_capacity(html.len());
    for c in html.chars() {
        match MARKERS.iter().find(|(marker, _)| *marker == c) {
            Some((_, text)) => restored.push_str(text),
            None => restored.push(c),
        }
    }
    restored
}
