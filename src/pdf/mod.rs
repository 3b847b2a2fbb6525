//! PDF text extraction.
//!
//! First-page text is read with Poppler's `pdftotext`. Callers depend on the
//! `PageTextSource` trait so another backend can be substituted.

mod text;

pub use text::{ExtractionError, PageTextSource, PdfToText};
