//! Backup pipeline
//!
//! Lists every workflow on the instance, classifies the non-archived
//! ones into an owner/tag hierarchy, writes one file per record copy,
//! and finishes with the run's index artifacts.

mod classifier;
mod index;
mod set;
mod writer;

pub use classifier::{Classification, FolderKey, NO_TAG, classify};
pub use index::{BackupIndex, BackupInfo, IndexedWorkflow};
pub use set::{BackupFile, BackupSummary, latest_backup, list_backups, read_backup_file, workflow_files};
pub use writer::{BackupWriter, backup_filename};

use crate::client::WorkflowApi;
use crate::workflow::{NO_OWNER, owner_label};
use eyre::{Context, Result};
use owo_colors::OwoColorize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Result of one backup run
#[derive(Debug)]
pub struct BackupReport {
    pub backup_dir: PathBuf,
    /// Workflows listed on the instance, archived included
    pub total: usize,
    /// Workflow file copies written
    pub success: usize,
    /// Copies that failed to fetch or write
    pub failed: usize,
    pub folders: usize,
}

/// Run a full backup into a fresh `backup_<timestamp>` directory.
///
/// A failure listing workflows is fatal and happens before anything is
/// written. A failure fetching or writing a single record copy is
/// logged, counted, and never aborts the run; the index lists only the
/// files that made it to disk.
pub async fn backup_workflows<A: WorkflowApi>(
    api: &A,
    instance: &str,
    output_root: impl AsRef<Path>,
) -> Result<BackupReport> {
    let started = chrono::Local::now();
    let captured_at = started.to_rfc3339();

    log::info!("Fetching workflows from {}...", instance.bright_black());
    let workflows = api
        .list_workflows()
        .await
        .context("Failed to fetch workflows")?;
    let total = workflows.len();
    log::info!("Found {} workflow(s)", total);

    // Full payloads, fetched once per non-archived workflow. The payload
    // both resolves the owner label and becomes the file content.
    let mut details: HashMap<String, Value> = HashMap::new();
    for workflow in workflows.iter().filter(|w| !w.archived) {
        match api.get_workflow(&workflow.id).await {
            Ok(detail) => {
                details.insert(workflow.id.clone(), detail);
            }
            Err(e) => {
                log::error!("Failed to fetch workflow '{}': {}", workflow.name, e);
            }
        }
    }

    log::info!("Organizing by owner and tags...");
    let classification = classify(workflows, |w| {
        details
            .get(&w.id)
            .map(owner_label)
            .unwrap_or_else(|| NO_OWNER.to_string())
    });

    let timestamp = started.format("%Y%m%d_%H%M%S").to_string();
    let writer = BackupWriter::create(output_root, &timestamp)?;
    log::info!("Backup directory: {}", writer.path().display().bright_black());

    let mut index = BackupIndex::new(captured_at.clone(), instance.to_string());
    let mut success = 0;
    let mut failed = 0;

    for (key, bucket) in &classification.folders {
        log::info!("{} ({} workflows)", key.to_string().cyan(), bucket.len());

        for workflow in bucket {
            let Some(detail) = details.get(&workflow.id) else {
                failed += 1;
                continue;
            };

            match writer.write_workflow(key, workflow, detail, &captured_at) {
                Ok(path) => {
                    log::debug!("Wrote {}", path.display());
                    index.add(key, workflow);
                    success += 1;
                }
                Err(e) => {
                    log::error!("Failed to save '{}': {}", workflow.name, e);
                    failed += 1;
                }
            }
        }
    }

    index.backup_info.total_workflows = total;
    index.backup_info.successful_downloads = success;
    index.backup_info.failed_downloads = failed;

    log::info!("Creating index file...");
    index.write(writer.path())?;

    Ok(BackupReport {
        backup_dir: writer.path().to_path_buf(),
        total,
        success,
        failed,
        folders: classification.folders.len(),
    })
}
