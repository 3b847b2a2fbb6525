//! Case document sync and case listing commands.

use console::style;
use tokio::sync::mpsc;

use phmsa_docs::config::Settings;
use phmsa_docs::services::sync::{
    parse_case_codes, DocumentSynchronizer, SyncEvent, SyncMode, SyncPlan,
};

use super::SyncModeArg;

/// Turn command-line flags into a run plan.
pub fn build_plan(
    mode: SyncModeArg,
    overwrite: bool,
    cases: Option<&str>,
    skip_existing_folders: bool,
) -> anyhow::Result<SyncPlan> {
    let codes = cases.map(parse_case_codes);

    let mode = match (mode, codes) {
        (SyncModeArg::Cases, None) => anyhow::bail!("--mode cases requires --cases"),
        (_, Some(codes)) if codes.is_empty() => anyhow::bail!("--cases contains no case codes"),
        (SyncModeArg::Cases, Some(codes)) | (SyncModeArg::All, Some(codes)) => {
            SyncMode::Cases(codes)
        }
        (SyncModeArg::Missing, Some(_)) => {
            anyhow::bail!("--cases cannot be combined with --mode missing")
        }
        (SyncModeArg::All, None) => SyncMode::All,
        (SyncModeArg::Missing, None) => SyncMode::Missing {
            skip_existing_folders,
        },
    };

    Ok(SyncPlan { mode, overwrite })
}

/// Synchronize case documents into the documents directory.
pub async fn cmd_sync(settings: &Settings, plan: SyncPlan) -> anyhow::Result<()> {
    let source = settings.case_source()?;
    let store = settings.case_store();

    println!(
        "{} Syncing case documents into {}",
        style("→").cyan(),
        store.root().display()
    );

    let (event_tx, mut event_rx) = mpsc::channel::<SyncEvent>(100);
    let synchronizer = DocumentSynchronizer::new(source, store).with_events(event_tx);

    // Spawn event handler task (UI layer)
    let event_handler = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                SyncEvent::CasesListed { total } => {
                    println!("{} {} cases to process", style("→").cyan(), total);
                }
                SyncEvent::CaseStarted {
                    index,
                    total,
                    case_code,
                } => {
                    tracing::debug!("[{}/{}] {}", index, total, case_code);
                }
                SyncEvent::CaseSkipped { case_code, reason } => {
                    println!("  {} {} ({})", style("→").dim(), case_code, reason);
                }
                SyncEvent::ManifestFetched {
                    case_code,
                    documents,
                    pending,
                } => {
                    if pending > 0 {
                        println!(
                            "{} {}: {} of {} documents to fetch",
                            style("→").cyan(),
                            case_code,
                            pending,
                            documents
                        );
                    }
                }
                SyncEvent::ManifestFailed { case_code, error } => {
                    eprintln!(
                        "{} Failed to fetch case {}: {}",
                        style("✗").red(),
                        case_code,
                        error
                    );
                }
                SyncEvent::DocumentDownloaded { case_code, name } => {
                    println!("  {} {}/{}", style("✓").green(), case_code, name);
                }
                SyncEvent::DocumentSkipped { case_code, name } => {
                    tracing::debug!("Skipped {}/{}", case_code, name);
                }
                SyncEvent::DocumentFailed {
                    case_code,
                    name,
                    error,
                } => {
                    eprintln!(
                        "  {} Failed to download {}/{}: {}",
                        style("✗").red(),
                        case_code,
                        name,
                        error
                    );
                }
                SyncEvent::CaseFinished { .. } => {}
            }
        }
    });

    let result = synchronizer.run(&plan).await;

    // Dropping the synchronizer closes the channel and ends the handler
    drop(synchronizer);
    if let Err(e) = event_handler.await {
        tracing::warn!("Event handler task failed: {}", e);
    }

    let summary = result?;

    println!(
        "{} Downloaded {} documents",
        style("✓").green(),
        summary.downloaded
    );
    if summary.skipped > 0 {
        println!(
            "  {} {} already present",
            style("→").dim(),
            summary.skipped
        );
    }
    if summary.cases_skipped > 0 {
        println!(
            "  {} {} cases skipped (folder exists)",
            style("→").dim(),
            summary.cases_skipped
        );
    }
    if summary.failed > 0 {
        println!(
            "  {} {} documents failed",
            style("!").yellow(),
            summary.failed
        );
    }
    if summary.cases_failed > 0 {
        println!(
            "  {} {} cases failed",
            style("!").yellow(),
            summary.cases_failed
        );
    }
    if summary.has_failures() {
        println!(
            "  {} Run the same command again to retry",
            style("→").dim()
        );
    }

    Ok(())
}

/// Print the case codes from the remote listing.
pub async fn cmd_cases(settings: &Settings, json: bool) -> anyhow::Result<()> {
    let synchronizer = DocumentSynchronizer::new(settings.case_source()?, settings.case_store());
    let cases = synchronizer.list_cases().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&cases)?);
        return Ok(());
    }

    if cases.is_empty() {
        println!("{} No cases listed", style("!").yellow());
        return Ok(());
    }

    for case in &cases {
        let marker = if synchronizer.store().case_dir_exists(&case.case_code) {
            style("✓").green()
        } else {
            style("·").dim()
        };
        println!("{} {}", marker, case.case_code);
    }
    println!("\n{} cases", cases.len());

    Ok(())
}
