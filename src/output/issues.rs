use crate::store::StoreSnapshot;
use std::fmt;

/// Recommended ceiling for title length, in characters
const MAX_TITLE_LENGTH: usize = 60;

/// Recommended bounds for meta description length, in characters
const MAX_DESCRIPTION_LENGTH: usize = 160;
const MIN_DESCRIPTION_LENGTH: usize = 50;

/// Recommended ceiling for URL length, in characters
const MAX_URL_LENGTH: usize = 115;

/// How much of a duplicated value is quoted in issue descriptions
const QUOTE_LENGTH: usize = 50;

/// Issue severity, ordered most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Alta,
    Media,
    Baja,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Alta => "Alta",
            Self::Media => "Media",
            Self::Baja => "Baja",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One flagged SEO problem on one page
#[derive(Debug, Clone)]
pub struct SeoIssue {
    pub url: String,
    pub kind: String,
    pub description: String,
    pub severity: Severity,
}

/// Derives the flagged-issues sheet from accumulated records
///
/// Pure function of the snapshot; returns issues sorted by severity
/// (Alta > Media > Baja).
pub fn derive_issues(snapshot: &StoreSnapshot) -> Vec<SeoIssue> {
    let mut issues = Vec::new();

    for (title, urls) in snapshot.duplicates.duplicated_titles() {
        for url in urls {
            issues.push(SeoIssue {
                url: url.clone(),
                kind: "Meta Título duplicado".to_string(),
                description: format!(
                    "Meta Título \"{}...\" usado en {} páginas",
                    quote(title),
                    urls.len()
                ),
                severity: Severity::Alta,
            });
        }
    }

    for (h1, urls) in snapshot.duplicates.duplicated_h1s() {
        for url in urls {
            issues.push(SeoIssue {
                url: url.clone(),
                kind: "H1 duplicado".to_string(),
                description: format!("H1 \"{}...\" usado en {} páginas", quote(h1), urls.len()),
                severity: Severity::Alta,
            });
        }
    }

    for (description, urls) in snapshot.duplicates.duplicated_descriptions() {
        for url in urls {
            issues.push(SeoIssue {
                url: url.clone(),
                kind: "Meta Description duplicada".to_string(),
                description: format!(
                    "Meta Description \"{}...\" usada en {} páginas",
                    quote(description),
                    urls.len()
                ),
                severity: Severity::Media,
            });
        }
    }

    for page in &snapshot.pages {
        if page.h1.is_none() {
            issues.push(SeoIssue {
                url: page.url.clone(),
                kind: "Sin H1".to_string(),
                description: "La página no tiene encabezado H1".to_string(),
                severity: Severity::Alta,
            });
        }

        if page.h1_count > 1 {
            issues.push(SeoIssue {
                url: page.url.clone(),
                kind: "Múltiples H1".to_string(),
                description: format!("La página tiene {} encabezados H1", page.h1_count),
                severity: Severity::Media,
            });
        }

        if page.title.is_none() {
            issues.push(SeoIssue {
                url: page.url.clone(),
                kind: "Sin Meta Título".to_string(),
                description: "La página no tiene meta título".to_string(),
                severity: Severity::Alta,
            });
        } else if page.title_length > MAX_TITLE_LENGTH {
            issues.push(SeoIssue {
                url: page.url.clone(),
                kind: "Meta Título muy largo".to_string(),
                description: format!(
                    "Meta Título tiene {} caracteres (máx. recomendado: {})",
                    page.title_length, MAX_TITLE_LENGTH
                ),
                severity: Severity::Media,
            });
        }

        if page.description.is_none() {
            issues.push(SeoIssue {
                url: page.url.clone(),
                kind: "Sin Meta Description".to_string(),
                description: "La página no tiene meta description".to_string(),
                severity: Severity::Alta,
            });
        } else if page.description_length > MAX_DESCRIPTION_LENGTH {
            issues.push(SeoIssue {
                url: page.url.clone(),
                kind: "Meta Description muy larga".to_string(),
                description: format!(
                    "Meta Description tiene {} caracteres (máx. recomendado: {})",
                    page.description_length, MAX_DESCRIPTION_LENGTH
                ),
                severity: Severity::Media,
            });
        } else if page.description_length < MIN_DESCRIPTION_LENGTH {
            issues.push(SeoIssue {
                url: page.url.clone(),
                kind: "Meta Description muy corta".to_string(),
                description: format!(
                    "Meta Description tiene solo {} caracteres (mín. recomendado: {})",
                    page.description_length, MIN_DESCRIPTION_LENGTH
                ),
                severity: Severity::Baja,
            });
        }

        if page.url_length > MAX_URL_LENGTH {
            issues.push(SeoIssue {
                url: page.url.clone(),
                kind: "URL muy larga".to_string(),
                description: format!(
                    "URL tiene {} caracteres (máx. recomendado: {})",
                    page.url_length, MAX_URL_LENGTH
                ),
                severity: Severity::Baja,
            });
        }
    }

    issues.sort_by_key(|issue| issue.severity);
    issues
}

fn quote(value: &str) -> String {
    value.chars().take(QUOTE_LENGTH).collect()
}
