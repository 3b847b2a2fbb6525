//! Bulk raw-data download command.

use std::path::PathBuf;

use console::style;

use phmsa_docs::config::Settings;
use phmsa_docs::services::raw_data::{fetch_raw_data, RAW_DATA_FILENAME};

/// Download the enforcement raw-data file.
pub async fn cmd_raw_data(settings: &Settings, output: Option<PathBuf>) -> anyhow::Result<()> {
    let dest = output.unwrap_or_else(|| settings.data_dir.join(RAW_DATA_FILENAME));
    let source = settings.case_source()?;

    println!(
        "{} Downloading {}",
        style("→").cyan(),
        settings.endpoints.raw_data_url
    );

    let bytes = fetch_raw_data(&source, &dest).await?;

    println!(
        "{} Saved {} bytes to {}",
        style("✓").green(),
        bytes,
        dest.display()
    );
    Ok(())
}
