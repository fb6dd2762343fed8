use scraper::{ElementRef, Html, Selector};

/// Elements whose text never belongs in the primary body.
const NON_CONTENT_TAGS: &[&str] = &["script", "style", "meta", "noscript", "header", "footer"];

/// Main-content containers, narrowest first.
const MAIN_CONTENT_SELECTORS: &[&str] = &["#centerCol", "#dp", "body"];

/// Collapse every whitespace run to a single space and trim.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Visible text of the narrowest available main-content container, cleaned.
pub fn primary_text(document: &Html) -> String {
    let container = MAIN_CONTENT_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .find_map(|sel| document.select(&sel).next())
        .unwrap_or_else(|| document.root_element());

    let mut parts = Vec::new();
    collect_visible_text(&container, &mut parts);
    clean_text(&parts.join(" "))
}

/// Recursively gather text nodes, skipping non-content subtrees.
fn collect_visible_text<'a>(element: &ElementRef<'a>, parts: &mut Vec<&'a str>) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            if NON_CONTENT_TAGS.contains(&child_element.value().name()) {
                continue;
            }
            collect_visible_text(&child_element, parts);
        } else if let Some(text) = child.value().as_text() {
            parts.push(&**text);
        }
    }
}

/// Visible text of a rich-content block: each trimmed fragment, single-space separated.
/// Inline `<style>`/`<script>` inside the block is skipped.
pub fn fragment_text(element: &ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    collect_visible_text(element, &mut parts);
    parts
        .into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// First `max` characters of `text` (never splits a code point).
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
