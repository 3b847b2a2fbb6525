//! Inspection location extraction from enforcement PDFs.
//!
//! Reads the first page of each PDF, isolates the sentence fragment after the
//! word "inspected", and picks out the first recognized city and every US
//! state named there. Heuristic and first-match only; a PDF that cannot be
//! read yields an empty record rather than an error.

mod gazetteer;
mod snippet;
mod states;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::models::ExtractionResult;
use crate::pdf::{ExtractionError, PageTextSource, PdfToText};

pub use gazetteer::Gazetteer;
pub use snippet::{inspection_snippet, normalize_whitespace};
pub use states::{match_states, US_STATES};

/// Extracts inspection locations using a page text backend and a gazetteer.
pub struct LocationExtractor<T = PdfToText> {
    text_source: T,
    gazetteer: Arc<Gazetteer>,
}

impl Default for LocationExtractor<PdfToText> {
    fn default() -> Self {
        Self::new(PdfToText::new())
    }
}

impl<T: PageTextSource> LocationExtractor<T> {
    /// Extractor using the built-in city list.
    pub fn new(text_source: T) -> Self {
        Self {
            text_source,
            gazetteer: Gazetteer::builtin(),
        }
    }

    pub fn with_gazetteer(mut self, gazetteer: Arc<Gazetteer>) -> Self {
        self.gazetteer = gazetteer;
        self
    }

    pub fn gazetteer(&self) -> &Gazetteer {
        &self.gazetteer
    }

    /// Run the location heuristic over already extracted page text.
    pub fn extract_from_text(&self, pdf_name: &str, text: &str) -> ExtractionResult {
        let Some(snippet) = inspection_snippet(text) else {
            return ExtractionResult::empty(pdf_name);
        };

        let city = self.gazetteer.first_city(&snippet);
        let states = match_states(&snippet);
        let state = if states.is_empty() {
            None
        } else {
            Some(states.join(", "))
        };

        ExtractionResult {
            pdf_name: pdf_name.to_string(),
            city,
            state,
            raw_snippet: Some(snippet),
        }
    }

    /// Extract the inspection location from the first page of a PDF.
    pub fn extract_from_pdf(&self, path: &Path) -> ExtractionResult {
        let pdf_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match self.text_source.first_page_text(path) {
            Ok(text) if !text.trim().is_empty() => self.extract_from_text(&pdf_name, &text),
            Ok(_) => {
                tracing::debug!("No text on first page of {}", path.display());
                ExtractionResult::empty(pdf_name)
            }
            Err(e) => {
                tracing::warn!("Could not read {}: {}", path.display(), e);
                ExtractionResult::empty(pdf_name)
            }
        }
    }

    /// Extract locations for every PDF directly inside `folder`.
    pub fn process_folder(&self, folder: &Path) -> Result<Vec<ExtractionResult>, ExtractionError> {
        let files = pdf_files(folder)?;
        tracing::info!("Extracting locations from {} PDFs", files.len());
        Ok(files
            .iter()
            .map(|path| self.extract_from_pdf(path))
            .collect())
    }
}

/// Files in `folder` with a `.pdf` extension (any case), in listing order.
pub fn pdf_files(folder: &Path) -> Result<Vec<PathBuf>, ExtractionError> {
    let entries = fs::read_dir(folder)?.map(|entry| entry.map(|e| e.path()));
    Ok(select_pdfs(folder, entries))
}

/// Keep PDF files from a directory listing. Unreadable entries are skipped.
fn select_pdfs(
    folder: &Path,
    entries: impl Iterator<Item = std::io::Result<PathBuf>>,
) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in {}: {}", folder.display(), e);
                continue;
            }
        };
        let is_pdf = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if is_pdf && path.is_file() {
            files.push(path);
        }
    }
    files
}
