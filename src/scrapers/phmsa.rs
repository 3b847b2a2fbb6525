//! PHMSA enforcement portal: endpoint templates, JSON parsing, and the
//! HTTP-backed `CaseSource`.
//!
//! The portal serves static page-data JSON. Only the fields needed to walk
//! cases and documents are modeled; everything else is ignored. A missing
//! required field is a `MalformedResponse`, never a defaulted record.

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::{CaseSource, DocumentStream, HttpClient, RawDataSource};
use crate::error::SyncError;
use crate::models::{CaseDocument, CaseRef};

pub const DEFAULT_CASE_LIST_URL: &str =
    "https://primis.phmsa.dot.gov/enforcement-data/page-data/cases/page-data.json";
pub const DEFAULT_CASE_DETAIL_URL: &str =
    "https://primis.phmsa.dot.gov/enforcement-data/page-data/case/{case}/page-data.json";
pub const DEFAULT_DOCUMENT_URL: &str =
    "https://primis.phmsa.dot.gov/enforcement-documents/{case}/{name}";
pub const DEFAULT_RAW_DATA_URL: &str =
    "https://primis.phmsa.dot.gov/enforcement-documents/PHMSA%20Pipeline%20Enforcement%20Raw%20Data.txt";

/// Endpoint URLs. Detail and document URLs are templates with `{case}` and
/// `{name}` placeholders, filled with percent-encoded path segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhmsaEndpoints {
    pub case_list_url: String,
    pub case_detail_url: String,
    pub document_url: String,
    pub raw_data_url: String,
}

impl Default for PhmsaEndpoints {
    fn default() -> Self {
        Self {
            case_list_url: DEFAULT_CASE_LIST_URL.to_string(),
            case_detail_url: DEFAULT_CASE_DETAIL_URL.to_string(),
            document_url: DEFAULT_DOCUMENT_URL.to_string(),
            raw_data_url: DEFAULT_RAW_DATA_URL.to_string(),
        }
    }
}

impl PhmsaEndpoints {
    pub fn detail_url(&self, case_code: &str) -> Result<String, SyncError> {
        render_template(&self.case_detail_url, case_code, "")
    }

    pub fn document_url(&self, case_code: &str, name: &str) -> Result<String, SyncError> {
        render_template(&self.document_url, case_code, name)
    }
}

fn render_template(template: &str, case_code: &str, name: &str) -> Result<String, SyncError> {
    let rendered = template
        .replace("{case}", &urlencoding::encode(case_code))
        .replace("{name}", &urlencoding::encode(name));
    Url::parse(&rendered)
        .map(|u| u.to_string())
        .map_err(|e| SyncError::malformed(rendered.clone(), format!("invalid URL: {}", e)))
}

#[derive(Deserialize)]
struct CaseListPage {
    result: CaseListResult,
}

#[derive(Deserialize)]
struct CaseListResult {
    data: CaseListData,
}

#[derive(Deserialize)]
struct CaseListData {
    postgres: CaseListTables,
}

#[derive(Deserialize)]
struct CaseListTables {
    sc_cases: Vec<CaseEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaseEntry {
    cpf_num: String,
}

#[derive(Deserialize)]
struct CaseDetailPage {
    result: CaseDetailResult,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaseDetailResult {
    page_context: CaseDetailContext,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaseDetailContext {
    case_documents: Vec<DocumentEntry>,
}

#[derive(Deserialize)]
struct DocumentEntry {
    name: String,
}

/// Parse the case-list page into case references.
pub fn parse_case_list(body: &[u8], url: &str) -> Result<Vec<CaseRef>, SyncError> {
    let page: CaseListPage =
        serde_json::from_slice(body).map_err(|e| SyncError::malformed(url, e.to_string()))?;

    page.result
        .data
        .postgres
        .sc_cases
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            if entry.cpf_num.trim().is_empty() {
                return Err(SyncError::malformed(
                    url,
                    format!("case {} has an empty cpfNum", i),
                ));
            }
            Ok(CaseRef::new(entry.cpf_num))
        })
        .collect()
}

/// Parse a case detail page into the case's document manifest.
pub fn parse_manifest(
    body: &[u8],
    url: &str,
    case_code: &str,
    endpoints: &PhmsaEndpoints,
) -> Result<Vec<CaseDocument>, SyncError> {
    let page: CaseDetailPage =
        serde_json::from_slice(body).map_err(|e| SyncError::malformed(url, e.to_string()))?;

    page.result
        .page_context
        .case_documents
        .into_iter()
        .map(|entry| {
            if entry.name.trim().is_empty() {
                return Err(SyncError::malformed(url, "document with an empty name"));
            }
            let doc_url = endpoints.document_url(case_code, &entry.name)?;
            Ok(CaseDocument::new(entry.name, doc_url))
        })
        .collect()
}

/// `CaseSource` backed by the live portal.
pub struct HttpCaseSource {
    client: HttpClient,
    endpoints: PhmsaEndpoints,
}

impl HttpCaseSource {
    pub fn new(client: HttpClient, endpoints: PhmsaEndpoints) -> Self {
        Self { client, endpoints }
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    pub fn endpoints(&self) -> &PhmsaEndpoints {
        &self.endpoints
    }
}

#[async_trait]
impl RawDataSource for HttpCaseSource {
    async fn open_raw_data(&self) -> Result<DocumentStream, SyncError> {
        let response = self.client.get_success(&self.endpoints.raw_data_url).await?;
        Ok(response.into_stream())
    }
}

#[async_trait]
impl CaseSource for HttpCaseSource {
    async fn list_cases(&self) -> Result<Vec<CaseRef>, SyncError> {
        let url = &self.endpoints.case_list_url;
        let body = self.client.get_bytes(url).await?;
        parse_case_list(&body, url)
    }

    async fn fetch_manifest(&self, case_code: &str) -> Result<Vec<CaseDocument>, SyncError> {
        let url = self.endpoints.detail_url(case_code)?;
        let body = self.client.get_bytes(&url).await?;
        parse_manifest(&body, &url, case_code, &self.endpoints)
    }

    async fn open_document(
        &self,
        _case_code: &str,
        document: &CaseDocument,
    ) -> Result<DocumentStream, SyncError> {
        let response = self.client.get_success(&document.url).await?;
        if let Some(ct) = response.content_type() {
            if !ct.contains("pdf") {
                tracing::debug!("{} served as {}", document.url, ct);
            }
        }
        if let Some(len) = response.content_length() {
            tracing::debug!("{}: {} bytes", document.name, len);
        }
        Ok(response.into_stream())
    }
}
