//! Extracted inspection location for one PDF.

use serde::Serialize;

/// Best-effort location pulled from the first page of a PDF.
///
/// All three fields are `None` when the page had no usable text or never
/// mentions an inspection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    pub pdf_name: String,
    pub city: Option<String>,
    /// Matched US state names joined with `", "`.
    pub state: Option<String>,
    pub raw_snippet: Option<String>,
}

impl ExtractionResult {
    /// Record for a PDF that yielded nothing.
    pub fn empty(pdf_name: impl Into<String>) -> Self {
        Self {
            pdf_name: pdf_name.into(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.city.is_none() && self.state.is_none() && self.raw_snippet.is_none()
    }
}
