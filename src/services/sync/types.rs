//! Sync service types and events.

/// Which cases a run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncMode {
    /// Every case from the remote listing.
    All,
    /// Every case from the remote listing, fetching only absent documents.
    Missing {
        /// Skip a case entirely, without fetching its manifest, when its
        /// folder already exists.
        skip_existing_folders: bool,
    },
    /// Explicit case codes; the remote listing is not consulted.
    Cases(Vec<String>),
}

/// A full run request.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub mode: SyncMode,
    /// Re-download documents that already exist locally. Ignored in `Missing` mode.
    pub overwrite: bool,
}

impl SyncPlan {
    pub fn effective_overwrite(&self) -> bool {
        match self.mode {
            SyncMode::Missing { .. } => false,
            _ => self.overwrite,
        }
    }
}

/// Parse a comma-separated list of case codes, dropping blanks.
pub fn parse_case_codes(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// Events emitted during a sync run.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// The case list was resolved.
    CasesListed { total: usize },
    /// Processing of a case began (1-based index).
    CaseStarted {
        index: usize,
        total: usize,
        case_code: String,
    },
    /// Case skipped without contacting the detail endpoint.
    CaseSkipped { case_code: String, reason: String },
    /// Manifest fetched; `pending` documents will be downloaded.
    ManifestFetched {
        case_code: String,
        documents: usize,
        pending: usize,
    },
    ManifestFailed { case_code: String, error: String },
    DocumentDownloaded { case_code: String, name: String },
    DocumentSkipped { case_code: String, name: String },
    DocumentFailed {
        case_code: String,
        name: String,
        error: String,
    },
    /// All documents of a case were handled.
    CaseFinished {
        case_code: String,
        downloaded: usize,
        skipped: usize,
        failed: usize,
    },
}
