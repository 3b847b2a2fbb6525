//! Case and case-document records.
//!
//! Both are ephemeral: they are rebuilt from the remote listing on every run
//! and never persisted.

use serde::{Deserialize, Serialize};

/// Reference to a single enforcement case, identified by its CPF number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaseRef {
    pub case_code: String,
}

impl CaseRef {
    pub fn new(case_code: impl Into<String>) -> Self {
        Self {
            case_code: case_code.into(),
        }
    }
}

/// A document listed in a case manifest.
///
/// `name` is unique within its case and doubles as the local filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseDocument {
    pub name: String,
    /// Remote retrieval URL, derived from the case code and `name`.
    pub url: String,
}

impl CaseDocument {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Check that a remote document name can be used as a plain filename
/// inside a case folder.
pub fn is_safe_document_name(name: &str) -> bool {
    !name.trim().is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}
