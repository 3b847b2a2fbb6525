//! Download outcomes and sync reports.

use serde::Serialize;

/// Result of a single document download attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum DownloadOutcome {
    Downloaded,
    /// Target already existed and overwrite was off; no network call made.
    Skipped,
    Failed(String),
}

impl DownloadOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Per-case counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub case_code: String,
    /// Manifest documents considered for this case.
    pub attempted: usize,
    pub downloaded: usize,
    /// Documents already present locally, plus explicit skips.
    pub skipped: usize,
    pub failed: usize,
    /// Set when the case could not be processed at all (manifest fetch or
    /// folder listing failed); the case then counts as failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncReport {
    pub fn new(case_code: impl Into<String>) -> Self {
        Self {
            case_code: case_code.into(),
            ..Default::default()
        }
    }

    /// Report for a case that failed before any document was attempted.
    pub fn case_failed(case_code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            case_code: case_code.into(),
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn record(&mut self, outcome: &DownloadOutcome) {
        match outcome {
            DownloadOutcome::Downloaded => self.downloaded += 1,
            DownloadOutcome::Skipped => self.skipped += 1,
            DownloadOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Aggregate over a whole synchronization run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub total_cases: usize,
    /// Cases skipped without a manifest fetch because their folder exists.
    pub cases_skipped: usize,
    pub cases_failed: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub reports: Vec<SyncReport>,
}

impl RunSummary {
    pub fn add(&mut self, report: SyncReport) {
        if report.is_failed() {
            self.cases_failed += 1;
        }
        self.downloaded += report.downloaded;
        self.skipped += report.skipped;
        self.failed += report.failed;
        self.reports.push(report);
    }

    pub fn cases_processed(&self) -> usize {
        self.reports.len()
    }

    pub fn has_failures(&self) -> bool {
        self.cases_failed > 0 || self.failed > 0
    }
}
