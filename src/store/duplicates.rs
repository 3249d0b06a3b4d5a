use std::collections::HashMap;

/// Append-only index from exact text values to the pages that produced them
///
/// Used to flag duplicate titles, H1s, and meta descriptions across a crawl.
/// Empty values are never recorded.
#[derive(Debug, Clone, Default)]
pub struct DuplicateIndex {
    titles: HashMap<String, Vec<String>>,
    h1s: HashMap<String, Vec<String>>,
    descriptions: HashMap<String, Vec<String>>,
}

impl DuplicateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_title(&mut self, title: &str, url: &str) {
        record(&mut self.titles, title, url);
    }

    pub fn record_h1(&mut self, h1: &str, url: &str) {
        record(&mut self.h1s, h1, url);
    }

    pub fn record_description(&mut self, description: &str, url: &str) {
        record(&mut self.descriptions, description, url);
    }

    /// URLs sharing the given title, in insertion order
    pub fn urls_for_title(&self, title: &str) -> &[String] {
        self.titles.get(title).map(|urls| urls.as_slice()).unwrap_or(&[])
    }

    /// Titles used by more than one page
    pub fn duplicated_titles(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.titles.iter().filter(|(_, urls)| urls.len() > 1)
    }

    /// H1 texts used by more than one page
    pub fn duplicated_h1s(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.h1s.iter().filter(|(_, urls)| urls.len() > 1)
    }

    /// Descriptions used by more than one page
    pub fn duplicated_descriptions(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.descriptions.iter().filter(|(_, urls)| urls.len() > 1)
    }
}

fn record(index: &mut HashMap<String, Vec<String>>, value: &str, url: &str) {
    if value.is_empty() {
        return;
    }
    index
        .entry(value.to_string())
        .or_default()
        .push(url.to_string());
}
