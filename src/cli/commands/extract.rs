//! Inspection location extraction command.

use std::path::Path;

use anyhow::Context;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use phmsa_docs::config::Settings;
use phmsa_docs::models::ExtractionResult;
use phmsa_docs::pdf::PdfToText;
use phmsa_docs::services::location::{pdf_files, LocationExtractor};

use super::OutputFormat;
use crate::cli::helpers::{escape_csv, truncate};

/// Extract inspection locations from every PDF in `folder`.
pub async fn cmd_extract(
    settings: &Settings,
    folder: &Path,
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let files = pdf_files(folder)
        .with_context(|| format!("Failed to read folder {}", folder.display()))?;

    if files.is_empty() {
        println!(
            "{} No PDF files in {}",
            style("!").yellow(),
            folder.display()
        );
        return Ok(());
    }

    let text_source = PdfToText::new();
    if !text_source.is_available() {
        eprintln!(
            "{} pdftotext not found (install poppler-utils); every record will be empty",
            style("!").yellow()
        );
    }

    let gazetteer = settings
        .gazetteer()
        .context("Failed to load gazetteer")?;
    let extractor = LocationExtractor::new(text_source).with_gazetteer(gazetteer);

    let bar = ProgressBar::new(files.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {msg} [{bar:30.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );

    // pdftotext runs synchronously; keep it off the async workers
    let results = tokio::task::spawn_blocking(move || {
        let mut results = Vec::with_capacity(files.len());
        for path in &files {
            if let Some(name) = path.file_name() {
                bar.set_message(truncate(&name.to_string_lossy(), 40));
            }
            results.push(extractor.extract_from_pdf(path));
            bar.inc(1);
        }
        bar.finish_and_clear();
        results
    })
    .await?;

    let rendered = match format {
        OutputFormat::Table => render_table(&results),
        OutputFormat::Json => serde_json::to_string_pretty(&results)? + "\n",
        OutputFormat::Csv => render_csv(&results),
    };

    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            let located = results.iter().filter(|r| !r.is_empty()).count();
            println!(
                "{} Wrote {} records ({} with an inspection location) to {}",
                style("✓").green(),
                results.len(),
                located,
                path.display()
            );
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

fn render_table(results: &[ExtractionResult]) -> String {
    let mut out = format!(
        "\n{:<40}  {:<20}  {:<24}  Snippet\n{}\n",
        "PDF",
        "City",
        "State",
        "-".repeat(110)
    );
    for r in results {
        out.push_str(&format!(
            "{:<40}  {:<20}  {:<24}  {}\n",
            truncate(&r.pdf_name, 40),
            truncate(r.city.as_deref().unwrap_or("-"), 20),
            truncate(r.state.as_deref().unwrap_or("-"), 24),
            truncate(r.raw_snippet.as_deref().unwrap_or("-"), 60),
        ));
    }
    out.push_str(&format!("\n{} PDFs\n", results.len()));
    out
}

fn render_csv(results: &[ExtractionResult]) -> String {
    let mut out = String::from("pdf_name,city,state,raw_snippet\n");
    for r in results {
        let fields = [
            Some(r.pdf_name.as_str()),
            r.city.as_deref(),
            r.state.as_deref(),
            r.raw_snippet.as_deref(),
        ];
        let row: Vec<String> = fields
            .iter()
            .map(|f| f.map(escape_csv).unwrap_or_default())
            .collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}
