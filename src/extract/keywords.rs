use std::collections::HashMap;

/// Spanish and English stopwords excluded from keyword frequencies
const STOPWORDS: &[&str] = &[
    // Spanish
    "de", "la", "que", "el", "en", "y", "a", "los", "del", "las", "un", "por", "con", "una",
    "su", "para", "es", "al", "lo", "como", "más", "o", "pero", "sus", "le", "ha", "me", "si",
    "sin", "sobre", "este", "ya", "entre", "cuando", "todo", "esta", "ser", "son", "dos",
    "también", "fue", "había", "era", "muy", "años", "hasta", "desde", "está", "mi", "porque",
    "qué", "sólo", "han", "yo", "hay", "vez", "puede", "todos", "así", "nos", "ni", "parte",
    "tiene", "él",
    // English
    "the", "and", "to", "of", "in", "for", "is", "on", "that", "by", "this", "with", "i",
    "you", "it", "not", "or", "be", "are", "from", "at", "as", "your", "all", "have", "new",
    "more", "an", "was", "we", "will", "can", "us", "about", "if", "my", "has", "but", "our",
    "one", "other", "do", "no", "they", "he", "may", "what", "which", "their", "any", "there",
    "who",
];

/// Words this short are noise regardless of frequency
const MIN_WORD_LENGTH: usize = 4;

/// Counts whitespace-separated words in a text
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// The most frequent content words of a text, most frequent first
///
/// Words are lowercased, split on non-alphanumeric characters, and filtered
/// against the stopword list and the minimum length. Ties break
/// alphabetically so the result is deterministic.
pub fn top_keywords(text: &str, limit: usize) -> Vec<String> {
    let mut frequencies: HashMap<String, usize> = HashMap::new();

    for word in text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() >= MIN_WORD_LENGTH)
        .filter(|w| !STOPWORDS.contains(w))
    {
        *frequencies.entry(word.to_string()).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, usize)> = frequencies.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked.into_iter().map(|(word, _)| word).collect()
}
