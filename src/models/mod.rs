//! Data models for case documents, sync reports and extracted locations.

mod case;
mod location;
mod report;

pub use case::{is_safe_document_name, CaseDocument, CaseRef};
pub use location::ExtractionResult;
pub use report::{DownloadOutcome, RunSummary, SyncReport};
