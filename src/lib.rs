//! phmsa-docs - PHMSA pipeline enforcement document sync.
//!
//! Mirrors the case documents published on the PHMSA enforcement portal into
//! one local folder per case, and extracts inspection locations from the
//! downloaded PDFs.

pub mod config;
pub mod error;
pub mod models;
pub mod pdf;
pub mod scrapers;
pub mod services;
pub mod storage;
