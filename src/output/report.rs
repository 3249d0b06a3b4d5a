use crate::crawler::format_elapsed;
use crate::output::issues::derive_issues;
use crate::output::OutputResult;
use crate::store::{PageStatus, StoreSnapshot};
use chrono::Local;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Crawl-level facts the summary sheet needs but the store does not hold
#[derive(Debug, Clone)]
pub struct ReportMeta {
    /// Seed URL or first listed URL
    pub analyzed_target: String,
    /// "Análisis Completo" or "Análisis URLs Específicas"
    pub mode_label: String,
    /// Total crawl time
    pub elapsed: Duration,
}

impl ReportMeta {
    pub fn whole_site(target: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            analyzed_target: target.into(),
            mode_label: "Análisis Completo".to_string(),
            elapsed,
        }
    }

    pub fn url_list(target: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            analyzed_target: target.into(),
            mode_label: "Análisis URLs Específicas".to_string(),
            elapsed,
        }
    }
}

/// Writes the full report as CSV files into a directory
///
/// One file per sheet: summary, per-page detail, flagged issues, images,
/// and links. Pure function of the snapshot; the engine's state is never
/// touched. Returns the paths written.
pub fn write_report(
    snapshot: &StoreSnapshot,
    dir: &Path,
    meta: &ReportMeta,
) -> OutputResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    written.push(write_sheet(dir, "resumen_seo.csv", format_summary(snapshot, meta))?);
    written.push(write_sheet(dir, "detalles_por_pagina.csv", format_pages(snapshot))?);
    written.push(write_sheet(dir, "problemas_seo.csv", format_issues(snapshot))?);
    written.push(write_sheet(dir, "imagenes.csv", format_images(snapshot))?);
    written.push(write_sheet(dir, "enlaces.csv", format_links(snapshot))?);

    Ok(written)
}

fn write_sheet(dir: &Path, name: &str, content: String) -> OutputResult<PathBuf> {
    let path = dir.join(name);
    let mut file = File::create(&path)?;
    file.write_all(content.as_bytes())?;
    Ok(path)
}

/// Formats the summary sheet
pub fn format_summary(snapshot: &StoreSnapshot, meta: &ReportMeta) -> String {
    let total = snapshot.pages.len();
    let successful = snapshot
        .pages
        .iter()
        .filter(|p| p.status == PageStatus::Code(200))
        .count();

    let mut csv = String::new();
    push_row(&mut csv, &["Métrica", "Valor"]);
    push_row(&mut csv, &["Total Páginas Analizadas", &total.to_string()]);
    push_row(&mut csv, &["Páginas Exitosas", &successful.to_string()]);
    push_row(
        &mut csv,
        &["Páginas con Error", &(total - successful).to_string()],
    );
    push_row(
        &mut csv,
        &["Tiempo Total Análisis", &format_elapsed(meta.elapsed)],
    );
    push_row(&mut csv, &["Tipo Análisis", &meta.mode_label]);
    push_row(&mut csv, &["Dominio Analizado", &meta.analyzed_target]);
    push_row(
        &mut csv,
        &["Generado", &Local::now().format("%d/%m/%Y %H:%M").to_string()],
    );
    csv
}

/// Formats the per-page detail sheet
pub fn format_pages(snapshot: &StoreSnapshot) -> String {
    let mut csv = String::new();
    push_row(
        &mut csv,
        &[
            "URL",
            "Status Code",
            "H1",
            "Meta Titulo",
            "Meta Description",
            "Longitud Meta Titulo",
            "Longitud Meta Description",
            "H2",
            "Palabras Clave",
            "Canonical",
            "Robots",
            "Anchor",
            "Word Count",
            "Longitud URL",
            "Cantidad H1",
            "hreflang_es",
            "hreflang_en",
            "hreflang_pt",
        ],
    );

    for page in &snapshot.pages {
        push_row(
            &mut csv,
            &[
                &page.url,
                &page.status.to_string(),
                page.h1.as_deref().unwrap_or(""),
                page.title.as_deref().unwrap_or(""),
                page.description.as_deref().unwrap_or(""),
                &page.title_length.to_string(),
                &page.description_length.to_string(),
                page.h2.as_deref().unwrap_or(""),
                page.keywords.as_deref().unwrap_or(""),
                page.canonical.as_deref().unwrap_or(""),
                page.robots.as_deref().unwrap_or(""),
                page.anchors.as_deref().unwrap_or(""),
                &page.word_count.to_string(),
                &page.url_length.to_string(),
                &page.h1_count.to_string(),
                page.hreflang_es.as_deref().unwrap_or(""),
                page.hreflang_en.as_deref().unwrap_or(""),
                page.hreflang_pt.as_deref().unwrap_or(""),
            ],
        );
    }
    csv
}

/// Formats the flagged-issues sheet
pub fn format_issues(snapshot: &StoreSnapshot) -> String {
    let mut csv = String::new();
    push_row(
        &mut csv,
        &["URL", "Tipo de Problema", "Descripción", "Gravedad"],
    );
    for issue in derive_issues(snapshot) {
        push_row(
            &mut csv,
            &[
                &issue.url,
                &issue.kind,
                &issue.description,
                issue.severity.label(),
            ],
        );
    }
    csv
}

/// Formats the images sheet
pub fn format_images(snapshot: &StoreSnapshot) -> String {
    let mut csv = String::new();
    push_row(
        &mut csv,
        &[
            "Pagina Origen",
            "URL Imagen",
            "Title",
            "Alt",
            "Tipo Imagen",
            "Peso",
            "Estado",
        ],
    );
    for image in &snapshot.images {
        push_row(
            &mut csv,
            &[
                &image.source_page,
                &image.image_url,
                &image.title,
                &image.alt,
                &image.image_type,
                &image.size,
                image.state.label(),
            ],
        );
    }
    csv
}

/// Formats the links sheet
pub fn format_links(snapshot: &StoreSnapshot) -> String {
    let mut csv = String::new();
    push_row(
        &mut csv,
        &[
            "Source Page",
            "Source Domain",
            "Target URL",
            "Target Domain",
            "Link Type",
            "Anchor Text",
            "Status",
            "Status Code",
        ],
    );
    for link in &snapshot.links {
        let code = link
            .status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_default();
        push_row(
            &mut csv,
            &[
                &link.source_page,
                &link.source_domain,
                &link.target_url,
                &link.target_domain,
                link.scope.label(),
                &link.anchor_text,
                &link.status.label(),
                &code,
            ],
        );
    }
    csv
}

fn push_row(csv: &mut String, fields: &[&str]) {
    let escaped: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
    csv.push_str(&escaped.join(","));
    csv.push('\n');
}

/// Quotes a field when it contains separators, quotes, or newlines
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
