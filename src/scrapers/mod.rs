//! Remote case sources for the PHMSA enforcement portal.

mod http_client;
mod phmsa;

pub use http_client::{resolve_user_agent, HttpClient, HttpResponse, USER_AGENT};
pub use phmsa::{
    parse_case_list, parse_manifest, HttpCaseSource, PhmsaEndpoints, DEFAULT_CASE_DETAIL_URL,
    DEFAULT_CASE_LIST_URL, DEFAULT_DOCUMENT_URL, DEFAULT_RAW_DATA_URL,
};

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::SyncError;
use crate::models::{CaseDocument, CaseRef};

/// Chunked body of a remote document.
pub type DocumentStream = BoxStream<'static, Result<Vec<u8>, SyncError>>;

/// Read-only view of the remote case listing, detail and document endpoints.
#[async_trait]
pub trait CaseSource: Send + Sync {
    /// Fetch the authoritative list of cases.
    async fn list_cases(&self) -> Result<Vec<CaseRef>, SyncError>;

    /// Fetch the document manifest for one case.
    async fn fetch_manifest(&self, case_code: &str) -> Result<Vec<CaseDocument>, SyncError>;

    /// Open the byte stream of one document.
    async fn open_document(
        &self,
        case_code: &str,
        document: &CaseDocument,
    ) -> Result<DocumentStream, SyncError>;
}

/// Source of the bulk enforcement raw-data file.
#[async_trait]
pub trait RawDataSource: Send + Sync {
    async fn open_raw_data(&self) -> Result<DocumentStream, SyncError>;
}
