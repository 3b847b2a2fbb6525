//! Local case folders and atomic publication of downloaded documents.
//!
//! Layout: `{documents_dir}/{case_code}/{document name}`. No index file is
//! kept; presence is decided by listing the folder.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use futures::StreamExt;

use crate::error::SyncError;
use crate::scrapers::DocumentStream;

/// Root directory holding one folder per case.
#[derive(Debug, Clone)]
pub struct CaseStore {
    root: PathBuf,
}

impl CaseStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn case_dir(&self, case_code: &str) -> PathBuf {
        self.root.join(case_code)
    }

    pub fn document_path(&self, case_code: &str, name: &str) -> PathBuf {
        self.case_dir(case_code).join(name)
    }

    pub fn case_dir_exists(&self, case_code: &str) -> bool {
        self.case_dir(case_code).is_dir()
    }

    /// Create the case folder if needed and return its path.
    pub fn ensure_case_dir(&self, case_code: &str) -> Result<PathBuf, SyncError> {
        let dir = self.case_dir(case_code);
        fs::create_dir_all(&dir).map_err(|e| SyncError::local_io(&dir, e))?;
        Ok(dir)
    }

    /// Names of the files present in a case folder. The folder is created
    /// when missing and reported as empty.
    pub fn local_document_names(&self, case_code: &str) -> Result<HashSet<String>, SyncError> {
        let dir = self.ensure_case_dir(case_code)?;
        let entries = fs::read_dir(&dir).map_err(|e| SyncError::local_io(&dir, e))?;

        let mut names = HashSet::new();
        for entry in entries {
            let entry = entry.map_err(|e| SyncError::local_io(&dir, e))?;
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.insert(name.to_string());
            }
        }
        Ok(names)
    }
}

/// Stream `body` into a temporary file next to `dest`, then rename it onto
/// `dest`. Nothing appears at `dest` unless the whole body was written.
///
/// Returns the number of bytes written.
pub async fn publish_stream(dest: &Path, mut body: DocumentStream) -> Result<u64, SyncError> {
    let dir = dest.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|e| SyncError::local_io(dir, e))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".phmsa-")
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(|e| SyncError::local_io(dir, e))?;

    let mut written: u64 = 0;
    while let Some(chunk) = body.next().await {
        // An Err here drops `tmp`, which removes the partial file.
        let chunk = chunk?;
        tmp.write_all(&chunk)
            .map_err(|e| SyncError::local_io(tmp.path(), e))?;
        written += chunk.len() as u64;
    }

    tmp.as_file()
        .sync_all()
        .map_err(|e| SyncError::local_io(tmp.path(), e))?;
    tmp.persist(dest)
        .map_err(|e| SyncError::local_io(dest, e.error))?;

    Ok(written)
}
