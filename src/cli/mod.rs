//! Command-line interface for phmsa-docs.

mod commands;
pub mod helpers;

pub use commands::{is_verbose, run};
