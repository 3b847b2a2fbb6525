//! Case document synchronization.
//!
//! Fetches the remote case list and per-case manifests, diffs each manifest
//! against the local case folder, and downloads what is absent. Failures are
//! recorded per case and per document; only a failed case listing aborts a
//! run. Re-running is the retry mechanism.

mod types;

use tokio::sync::mpsc;

use crate::error::SyncError;
use crate::models::{
    is_safe_document_name, CaseDocument, CaseRef, DownloadOutcome, RunSummary, SyncReport,
};
use crate::scrapers::CaseSource;
use crate::storage::{publish_stream, CaseStore};

pub use types::{parse_case_codes, SyncEvent, SyncMode, SyncPlan};

/// Synchronizes remote case documents into a `CaseStore`.
pub struct DocumentSynchronizer<S> {
    source: S,
    store: CaseStore,
    events: Option<mpsc::Sender<SyncEvent>>,
}

impl<S: CaseSource> DocumentSynchronizer<S> {
    pub fn new(source: S, store: CaseStore) -> Self {
        Self {
            source,
            store,
            events: None,
        }
    }

    /// Publish progress events on `tx`.
    pub fn with_events(mut self, tx: mpsc::Sender<SyncEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn store(&self) -> &CaseStore {
        &self.store
    }

    async fn emit(&self, event: SyncEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event).await;
        }
    }

    /// Fetch the authoritative case list.
    pub async fn list_cases(&self) -> Result<Vec<CaseRef>, SyncError> {
        let cases = self.source.list_cases().await?;
        tracing::info!("Found {} cases", cases.len());
        Ok(cases)
    }

    /// Fetch the document manifest of one case.
    pub async fn fetch_manifest(&self, case_code: &str) -> Result<Vec<CaseDocument>, SyncError> {
        let manifest = self.source.fetch_manifest(case_code).await?;
        tracing::debug!("Case {}: {} documents listed", case_code, manifest.len());
        Ok(manifest)
    }

    /// Manifest entries with no same-named file in the case folder, in
    /// manifest order. Creates the folder when it does not exist.
    pub fn missing_documents(
        &self,
        case_code: &str,
        manifest: &[CaseDocument],
    ) -> Result<Vec<CaseDocument>, SyncError> {
        let local = self.store.local_document_names(case_code)?;
        Ok(manifest
            .iter()
            .filter(|doc| !local.contains(&doc.name))
            .cloned()
            .collect())
    }

    /// Download one document.
    ///
    /// Without `overwrite` an existing file is left alone and no request is
    /// made. The body is published atomically; a failure mid-stream leaves
    /// the destination as it was.
    pub async fn download_document(
        &self,
        case_code: &str,
        document: &CaseDocument,
        overwrite: bool,
    ) -> DownloadOutcome {
        if !is_safe_document_name(&document.name) {
            return DownloadOutcome::Failed(format!(
                "refusing unsafe document name {:?}",
                document.name
            ));
        }

        let dest = self.store.document_path(case_code, &document.name);
        if !overwrite && dest.exists() {
            tracing::debug!("Skipping existing {}", dest.display());
            return DownloadOutcome::Skipped;
        }

        let body = match self.source.open_document(case_code, document).await {
            Ok(body) => body,
            Err(e) => return DownloadOutcome::Failed(e.to_string()),
        };

        match publish_stream(&dest, body).await {
            Ok(bytes) => {
                tracing::debug!("Wrote {} bytes to {}", bytes, dest.display());
                DownloadOutcome::Downloaded
            }
            Err(e) => DownloadOutcome::Failed(e.to_string()),
        }
    }

    /// Fetch a case manifest and download its documents: all of them with
    /// `overwrite`, otherwise only the missing ones.
    pub async fn sync_case(&self, case_code: &str, overwrite: bool) -> SyncReport {
        let manifest = match self.fetch_manifest(case_code).await {
            Ok(m) => m,
            Err(e) => return self.fail_case(case_code, e).await,
        };

        let targets = if overwrite {
            manifest.clone()
        } else {
            match self.missing_documents(case_code, &manifest) {
                Ok(missing) => missing,
                Err(e) => return self.fail_case(case_code, e).await,
            }
        };

        let mut report = SyncReport::new(case_code);
        report.attempted = manifest.len();
        report.skipped = manifest.len() - targets.len();

        self.emit(SyncEvent::ManifestFetched {
            case_code: case_code.to_string(),
            documents: manifest.len(),
            pending: targets.len(),
        })
        .await;

        for document in &targets {
            let outcome = self.download_document(case_code, document, overwrite).await;
            report.record(&outcome);

            let event = match outcome {
                DownloadOutcome::Downloaded => SyncEvent::DocumentDownloaded {
                    case_code: case_code.to_string(),
                    name: document.name.clone(),
                },
                DownloadOutcome::Skipped => SyncEvent::DocumentSkipped {
                    case_code: case_code.to_string(),
                    name: document.name.clone(),
                },
                DownloadOutcome::Failed(error) => {
                    tracing::warn!("Failed {} / {}: {}", case_code, document.name, error);
                    SyncEvent::DocumentFailed {
                        case_code: case_code.to_string(),
                        name: document.name.clone(),
                        error,
                    }
                }
            };
            self.emit(event).await;
        }

        self.emit(SyncEvent::CaseFinished {
            case_code: case_code.to_string(),
            downloaded: report.downloaded,
            skipped: report.skipped,
            failed: report.failed,
        })
        .await;

        report
    }

    async fn fail_case(&self, case_code: &str, error: SyncError) -> SyncReport {
        tracing::warn!("Failed case {} ({}): {}", case_code, error.kind(), error);
        self.emit(SyncEvent::ManifestFailed {
            case_code: case_code.to_string(),
            error: error.to_string(),
        })
        .await;
        SyncReport::case_failed(case_code, error.to_string())
    }

    /// Run a full synchronization.
    ///
    /// Returns an error only when the initial case list cannot be fetched.
    pub async fn run(&self, plan: &SyncPlan) -> Result<RunSummary, SyncError> {
        let overwrite = plan.effective_overwrite();

        let case_codes: Vec<String> = match &plan.mode {
            SyncMode::Cases(codes) => codes.clone(),
            SyncMode::All | SyncMode::Missing { .. } => self
                .list_cases()
                .await?
                .into_iter()
                .map(|c| c.case_code)
                .collect(),
        };
        let skip_existing = matches!(
            plan.mode,
            SyncMode::Missing {
                skip_existing_folders: true
            }
        );

        let total = case_codes.len();
        self.emit(SyncEvent::CasesListed { total }).await;

        let mut summary = RunSummary {
            total_cases: total,
            ..Default::default()
        };

        for (i, case_code) in case_codes.iter().enumerate() {
            self.emit(SyncEvent::CaseStarted {
                index: i + 1,
                total,
                case_code: case_code.clone(),
            })
            .await;

            if skip_existing && self.store.case_dir_exists(case_code) {
                summary.cases_skipped += 1;
                self.emit(SyncEvent::CaseSkipped {
                    case_code: case_code.clone(),
                    reason: "folder exists".to_string(),
                })
                .await;
                continue;
            }

            let report = self.sync_case(case_code, overwrite).await;
            summary.add(report);
        }

        tracing::info!(
            "Sync finished: {} downloaded, {} skipped, {} failed, {} cases failed",
            summary.downloaded,
            summary.skipped,
            summary.failed,
            summary.cases_failed
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::{HashMap, HashSet};
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use futures::stream::{self, StreamExt};

    use crate::scrapers::DocumentStream;

    /// In-memory portal. Documents listed in `broken` fail after their first chunk.
    #[derive(Default)]
    struct FakeSource {
        cases: Option<Vec<String>>,
        manifests: HashMap<String, Vec<String>>,
        bodies: Mutex<HashMap<(String, String), Vec<u8>>>,
        broken: HashSet<String>,
        document_requests: AtomicUsize,
    }

    impl FakeSource {
        fn with_case(mut self, case_code: &str, names: &[&str]) -> Self {
            self.manifests.insert(
                case_code.to_string(),
                names.iter().map(|n| n.to_string()).collect(),
            );
            for name in names {
                self.set_body(case_code, name, format!("{}/{}", case_code, name).as_bytes());
            }
            self.cases
                .get_or_insert_with(Vec::new)
                .push(case_code.to_string());
            self
        }

        fn set_body(&self, case_code: &str, name: &str, body: &[u8]) {
            self.bodies
                .lock()
                .unwrap()
                .insert((case_code.to_string(), name.to_string()), body.to_vec());
        }

        fn requests(&self) -> usize {
            self.document_requests.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CaseSource for FakeSource {
        async fn list_cases(&self) -> Result<Vec<CaseRef>, SyncError> {
            match &self.cases {
                Some(codes) => Ok(codes.iter().map(CaseRef::new).collect()),
                None => Err(SyncError::RemoteUnavailable("HTTP 503".to_string())),
            }
        }

        async fn fetch_manifest(&self, case_code: &str) -> Result<Vec<CaseDocument>, SyncError> {
            let names = self
                .manifests
                .get(case_code)
                .ok_or_else(|| SyncError::RemoteUnavailable(format!("HTTP 404 for {}", case_code)))?;
            Ok(names
                .iter()
                .map(|n| CaseDocument::new(n.clone(), format!("fake://{}/{}", case_code, n)))
                .collect())
        }

        async fn open_document(
            &self,
            case_code: &str,
            document: &CaseDocument,
        ) -> Result<DocumentStream, SyncError> {
            self.document_requests.fetch_add(1, Ordering::SeqCst);
            let body = self
                .bodies
                .lock()
                .unwrap()
                .get(&(case_code.to_string(), document.name.clone()))
                .cloned()
                .ok_or_else(|| SyncError::RemoteUnavailable("HTTP 404".to_string()))?;

            if self.broken.contains(&document.name) {
                let half = body[..body.len() / 2].to_vec();
                return Ok(stream::iter(vec![
                    Ok(half),
                    Err(SyncError::RemoteUnavailable("connection reset".to_string())),
                ])
                .boxed());
            }
            Ok(stream::iter(vec![Ok(body)]).boxed())
        }
    }

    fn synchronizer(source: FakeSource) -> (DocumentSynchronizer<FakeSource>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = CaseStore::new(dir.path());
        (DocumentSynchronizer::new(source, store), dir)
    }

    #[tokio::test]
    async fn test_sync_case_twice_downloads_nothing_the_second_time() {
        let source = FakeSource::default().with_case("1-2024-1001", &["a.pdf", "b.pdf"]);
        let (sync, _dir) = synchronizer(source);

        let first = sync.sync_case("1-2024-1001", false).await;
        assert_eq!(first.downloaded, 2);
        assert_eq!(first.attempted, 2);

        let second = sync.sync_case("1-2024-1001", false).await;
        assert_eq!(second.downloaded, 0);
        assert_eq!(second.skipped, 2);
        assert_eq!(second.failed, 0);
        assert_eq!(sync.source().requests(), 2);
    }

    #[tokio::test]
    async fn test_missing_documents_is_set_difference() {
        let (sync, _dir) = synchronizer(FakeSource::default());
        let case_dir = sync.store().ensure_case_dir("C").unwrap();
        fs::write(case_dir.join("b.pdf"), b"local").unwrap();
        fs::write(case_dir.join("unrelated.pdf"), b"local").unwrap();

        let manifest = vec![
            CaseDocument::new("a.pdf", "u/a"),
            CaseDocument::new("b.pdf", "u/b"),
            CaseDocument::new("c.pdf", "u/c"),
        ];
        let missing = sync.missing_documents("C", &manifest).unwrap();

        assert_eq!(
            missing,
            vec![
                CaseDocument::new("a.pdf", "u/a"),
                CaseDocument::new("c.pdf", "u/c")
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_documents_creates_case_folder() {
        let (sync, _dir) = synchronizer(FakeSource::default());
        let manifest = vec![CaseDocument::new("a.pdf", "u/a")];

        let missing = sync.missing_documents("NEW", &manifest).unwrap();
        assert_eq!(missing, manifest);
        assert!(sync.store().case_dir_exists("NEW"));
    }

    #[tokio::test]
    async fn test_download_skips_existing_without_request() {
        let source = FakeSource::default().with_case("C", &["a.pdf"]);
        let (sync, _dir) = synchronizer(source);
        let case_dir = sync.store().ensure_case_dir("C").unwrap();
        fs::write(case_dir.join("a.pdf"), b"old").unwrap();

        let doc = CaseDocument::new("a.pdf", "fake://C/a.pdf");
        let outcome = sync.download_document("C", &doc, false).await;

        assert_eq!(outcome, DownloadOutcome::Skipped);
        assert_eq!(sync.source().requests(), 0);
        assert_eq!(fs::read(case_dir.join("a.pdf")).unwrap(), b"old");
    }

    #[tokio::test]
    async fn test_overwrite_replaces_existing_content() {
        let source = FakeSource::default().with_case("C", &["a.pdf"]);
        source.set_body("C", "a.pdf", b"fresh");
        let (sync, _dir) = synchronizer(source);
        let case_dir = sync.store().ensure_case_dir("C").unwrap();
        fs::write(case_dir.join("a.pdf"), b"stale").unwrap();

        let report = sync.sync_case("C", true).await;

        assert_eq!(report.downloaded, 1);
        assert_eq!(report.skipped, 0);
        assert_eq!(fs::read(case_dir.join("a.pdf")).unwrap(), b"fresh");
    }

    #[tokio::test]
    async fn test_interrupted_download_leaves_document_missing() {
        let mut source = FakeSource::default().with_case("C", &["good.pdf", "broken.pdf"]);
        source.broken.insert("broken.pdf".to_string());
        let (sync, _dir) = synchronizer(source);

        let report = sync.sync_case("C", false).await;
        assert_eq!(report.downloaded, 1);
        assert_eq!(report.failed, 1);

        let dest = sync.store().document_path("C", "broken.pdf");
        assert!(!dest.exists());

        let manifest = sync.fetch_manifest("C").await.unwrap();
        let missing = sync.missing_documents("C", &manifest).unwrap();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].name, "broken.pdf");
    }

    #[tokio::test]
    async fn test_unsafe_name_fails_only_that_document() {
        let source = FakeSource::default().with_case("C", &["a.pdf", "x/y.pdf", "b.pdf"]);
        let (sync, dir) = synchronizer(source);

        let report = sync.sync_case("C", false).await;

        assert!(report.error.is_none());
        assert_eq!(report.attempted, 3);
        assert_eq!(report.downloaded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(sync.source().requests(), 2);
        assert!(sync.store().document_path("C", "a.pdf").exists());
        assert!(sync.store().document_path("C", "b.pdf").exists());
        assert!(!dir.path().join("C").join("x").exists());
    }

    #[tokio::test]
    async fn test_manifest_failure_is_recorded_not_fatal() {
        let mut source = FakeSource::default().with_case("GOOD", &["a.pdf"]);
        source.cases.as_mut().unwrap().insert(0, "GONE".to_string());
        let (sync, _dir) = synchronizer(source);

        let summary = sync
            .run(&SyncPlan {
                mode: SyncMode::All,
                overwrite: false,
            })
            .await
            .unwrap();

        assert_eq!(summary.total_cases, 2);
        assert_eq!(summary.cases_failed, 1);
        assert_eq!(summary.downloaded, 1);
        assert!(summary.reports[0].error.is_some());
        assert!(summary.reports[1].error.is_none());
    }

    #[tokio::test]
    async fn test_case_list_failure_aborts_run() {
        let (sync, _dir) = synchronizer(FakeSource::default());

        let result = sync
            .run(&SyncPlan {
                mode: SyncMode::All,
                overwrite: false,
            })
            .await;

        assert!(matches!(result, Err(SyncError::RemoteUnavailable(_))));
    }

    #[tokio::test]
    async fn test_specific_cases_do_not_list() {
        let mut source = FakeSource::default().with_case("C", &["a.pdf"]);
        source.cases = None;
        let (sync, _dir) = synchronizer(source);

        let summary = sync
            .run(&SyncPlan {
                mode: SyncMode::Cases(vec!["C".to_string()]),
                overwrite: false,
            })
            .await
            .unwrap();

        assert_eq!(summary.total_cases, 1);
        assert_eq!(summary.downloaded, 1);
    }

    #[tokio::test]
    async fn test_missing_mode_skips_existing_folders() {
        let source = FakeSource::default()
            .with_case("OLD", &["a.pdf"])
            .with_case("NEW", &["b.pdf"]);
        let (sync, _dir) = synchronizer(source);
        sync.store().ensure_case_dir("OLD").unwrap();

        let summary = sync
            .run(&SyncPlan {
                mode: SyncMode::Missing {
                    skip_existing_folders: true,
                },
                overwrite: true,
            })
            .await
            .unwrap();

        assert_eq!(summary.cases_skipped, 1);
        assert_eq!(summary.cases_processed(), 1);
        assert_eq!(summary.downloaded, 1);
        assert!(!sync.store().document_path("OLD", "a.pdf").exists());
        assert!(sync.store().document_path("NEW", "b.pdf").exists());
    }

    #[tokio::test]
    async fn test_events_report_progress() {
        let source = FakeSource::default().with_case("C", &["a.pdf"]);
        let (sync, _dir) = synchronizer(source);
        let (tx, mut rx) = mpsc::channel(32);
        let sync = sync.with_events(tx);

        sync.run(&SyncPlan {
            mode: SyncMode::All,
            overwrite: false,
        })
        .await
        .unwrap();
        drop(sync);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }

        assert!(matches!(events[0], SyncEvent::CasesListed { total: 1 }));
        assert!(events
            .iter()
            .any(|e| matches!(e, SyncEvent::DocumentDownloaded { name, .. } if name == "a.pdf")));
        assert!(matches!(
            events.last(),
            Some(SyncEvent::CaseFinished { downloaded: 1, .. })
        ));
    }
}
