use scraper::{ElementRef, Html, Selector};

/// Elements whose text never counts as page content
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "iframe", "noscript"];

/// id/class fragments that usually mark the main content container
const CONTAINER_HINTS: &[&str] = &[
    "content", "main", "page", "site", "wrap", "container", "app", "region", "contenido",
];

/// Collects the visible text under an element, skipping script, style,
/// iframe, and noscript subtrees
pub fn visible_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    normalize_whitespace(&out)
}

/// Visible text of the whole document (body when present)
pub fn document_text(document: &Html) -> String {
    if let Ok(selector) = Selector::parse("body") {
        if let Some(body) = document.select(&selector).next() {
            return visible_text(body);
        }
    }
    visible_text(document.root_element())
}

/// Finds the container most likely to hold the main page content
///
/// Preference order: the first `<main>` element, then the first element
/// whose id or class contains a common content-container name, then
/// `<body>`, then the document root.
pub fn main_container(document: &Html) -> ElementRef<'_> {
    if let Ok(selector) = Selector::parse("main") {
        if let Some(main) = document.select(&selector).next() {
            return main;
        }
    }

    if let Ok(selector) = Selector::parse("*") {
        for element in document.select(&selector) {
            if matches_container_hint(element) {
                return element;
            }
        }
    }

    if let Ok(selector) = Selector::parse("body") {
        if let Some(body) = document.select(&selector).next() {
            return body;
        }
    }

    document.root_element()
}

/// Number of heading elements (h1-h6) in the document
pub fn heading_count(document: &Html) -> usize {
    match Selector::parse("h1, h2, h3, h4, h5, h6") {
        Ok(selector) => document.select(&selector).count(),
        Err(_) => 0,
    }
}

fn matches_container_hint(element: ElementRef<'_>) -> bool {
    if let Some(id) = element.value().attr("id") {
        let id = id.to_lowercase();
        if CONTAINER_HINTS.iter().any(|hint| id.contains(hint)) {
            return true;
        }
    }
    element
        .value()
        .classes()
        .any(|class| has_hint(&class.to_lowercase()))
}

fn has_hint(class: &str) -> bool {
    CONTAINER_HINTS.iter().any(|hint| class.contains(hint))
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if !SKIPPED_ELEMENTS.contains(&child_element.value().name()) {
                collect_text(child_element, out);
            }
        }
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
