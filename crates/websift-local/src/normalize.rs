//! HTML -> markdown normalization.
//!
//! Deterministic and pure: no network, no state, and it never fails —
//! empty or unparseable input yields an empty string.

use std::io::Cursor;

/// Render width for the markdown conversion.
const RENDER_WIDTH: usize = 100;

/// Subtrees dropped before conversion. Structural chrome only; no
/// site-specific heuristics.
const STRIP: &[&str] = &[
    "head", "script", "style", "nav", "header", "footer", "aside", "noscript", "iframe", "form",
    "svg", "template",
];

/// Void elements that survive stripping and must not get a closing tag.
const VOID_KEEP: &[&str] = &["br", "hr"];

/// Convert raw page HTML into clean markdown text.
///
/// Non-content elements (scripts, styles, navigation chrome) are removed,
/// then the remainder is rendered with ATX-style `#` headings and `*` list
/// markers.
pub fn normalize(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }
    let stripped = strip_noncontent(html);
    let text = html2text::from_read(Cursor::new(stripped.as_bytes()), RENDER_WIDTH)
        .unwrap_or_default();
    collapse_blank_lines(&text)
}

/// Rebuild the document without boilerplate subtrees or comments.
///
/// Only `href` attributes are carried over; everything else is noise for a
/// text rendering.
fn strip_noncontent(html: &str) -> String {
    let doc = scraper::Html::parse_document(html);
    let mut out = String::with_capacity(html.len());
    write_clean(doc.root_element(), &mut out);
    out
}

fn write_clean(el: scraper::ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            push_escaped(text, out);
            continue;
        }
        let Some(child_el) = scraper::ElementRef::wrap(child) else {
            // Comments, processing instructions: drop.
            continue;
        };
        let name = child_el.value().name();
        if STRIP.contains(&name) {
            continue;
        }
        if VOID_KEEP.contains(&name) {
            out.push('<');
            out.push_str(name);
            out.push('>');
            continue;
        }
        out.push('<');
        out.push_str(name);
        if name == "a" {
            if let Some(href) = child_el.value().attr("href") {
                out.push_str(" href=\"");
                push_escaped_attr(href, out);
                out.push('"');
            }
        }
        out.push('>');
        write_clean(child_el, out);
        out.push_str("</");
        out.push_str(name);
        out.push('>');
    }
}

fn push_escaped(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn push_escaped_attr(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blanks = 0usize;
    for line in text.lines() {
        if line.trim().is_empty() {
            blanks += 1;
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
            if blanks > 0 {
                out.push('\n');
            }
        }
        blanks = 0;
        out.push_str(line.trim_end());
    }
    if !out.is_empty() {
        out.push('\n');
    }
    out
}
