//! CLI helper functions
//!
//! Command orchestration plus the interactive prompts for restore. The
//! backup and restore pipelines never touch the terminal themselves; all
//! prompting and confirmation happens here before they run.

use crate::{
    backup,
    client::N8n,
    config::Config,
    restore::{Reconciler, RestoreMode, RestoreSummary},
};
use eyre::{Context, Result};
use owo_colors::OwoColorize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Build an n8n client from loaded configuration
pub fn load_client(config: &Config) -> Result<N8n> {
    N8n::try_new(config.api_url.clone(), &config.api_key).context("Failed to create n8n client")
}

/// Probe the instance with the configured credentials
pub async fn run_auth() -> Result<()> {
    let config = Config::load()?;
    let client = load_client(&config)?;

    client.test_connection().await?;
    log::info!("✓ Authorized to {}", client.to_string().bright_black());

    Ok(())
}

/// Back up every workflow into a fresh timestamped directory
pub async fn run_backup(output_dir: Option<String>) -> Result<()> {
    let config = Config::load()?;
    let client = load_client(&config)?;

    let output_root = output_dir
        .map(PathBuf::from)
        .unwrap_or_else(|| config.backup_dir.clone());

    let report = backup::backup_workflows(&client, config.api_url.as_str(), &output_root).await?;

    log::info!("Download complete");
    log::info!("Total workflows: {}", report.total);
    log::info!(
        "Successfully downloaded: {}",
        report.success.to_string().green()
    );
    if report.failed > 0 {
        log::error!("Failed: {}", report.failed.to_string().red());
    }
    log::info!(
        "Backup location: {}",
        report.backup_dir.display().bright_black()
    );
    log::info!(
        "Files created: index.json, README.md, and {} folder(s) with workflow files",
        report.folders
    );

    Ok(())
}

/// Restore a backup directory, prompting for anything not given as a flag
pub async fn run_restore(
    backup_dir: Option<String>,
    mode: Option<RestoreMode>,
    yes: bool,
    dry_run: bool,
) -> Result<()> {
    let config = Config::load()?;

    let backup_dir = match backup_dir {
        Some(dir) => {
            let path = PathBuf::from(dir);
            if !path.exists() {
                eyre::bail!("Backup directory not found: {}", path.display());
            }
            path
        }
        // Non-interactive runs take the most recent backup
        None if yes => match backup::latest_backup(&config.backup_dir)? {
            Some(latest) => {
                log::info!("Using most recent backup: {}", latest.name.bright_black());
                latest.path
            }
            None => eyre::bail!(
                "No backup directories found in {}",
                config.backup_dir.display()
            ),
        },
        None => match select_backup_dir(&config.backup_dir)? {
            Some(path) => path,
            None => {
                log::warn!("Restore cancelled");
                return Ok(());
            }
        },
    };
    log::info!("Backup directory: {}", backup_dir.display().bright_black());

    if dry_run {
        let files = backup::workflow_files(&backup_dir)?;
        log::warn!("DRY RUN MODE - no changes will be made");
        log::info!("{} workflow file(s) would be restored:", files.len());
        for file in &files {
            let relative = file.strip_prefix(&backup_dir).unwrap_or(file);
            log::info!("  • {}", relative.display());
        }
        return Ok(());
    }

    let mode = match mode {
        Some(mode) => mode,
        None => select_restore_mode()?,
    };
    log::info!("Restore mode: {}", mode.cyan());

    if !yes {
        let name = backup_dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("backup");
        if !confirm(&format!("Restore workflows from {}? (yes/no): ", name))? {
            log::warn!("Restore cancelled");
            return Ok(());
        }
    }

    let client = load_client(&config)?;
    let reconciler = Reconciler::new(&client, mode, chrono::Local::now());
    let summary = reconciler.restore_backup(&backup_dir).await?;

    print_restore_summary(&summary, config.api_url.as_str());

    Ok(())
}

/// Interactively pick one of the discovered backup directories.
///
/// Returns `None` when the operator quits the prompt.
fn select_backup_dir(base: &Path) -> Result<Option<PathBuf>> {
    let backups = backup::list_backups(base)?;
    if backups.is_empty() {
        eyre::bail!("No backup directories found in {}", base.display());
    }

    log::info!("Available backups:");
    for (i, summary) in backups.iter().enumerate() {
        let count = summary
            .workflow_count
            .map(|c| c.to_string())
            .unwrap_or_else(|| "?".to_string());
        println!("  {}. {} ({} workflows)", i + 1, summary.name, count);
    }

    loop {
        let choice = prompt(&format!(
            "Select backup (1-{}) or 'q' to quit: ",
            backups.len()
        ))?;
        if choice.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        match choice.parse::<usize>() {
            Ok(n) if (1..=backups.len()).contains(&n) => {
                return Ok(Some(backups[n - 1].path.clone()));
            }
            _ => log::error!("Invalid selection"),
        }
    }
}

/// Interactively pick a restore mode; Enter takes the default (skip).
fn select_restore_mode() -> Result<RestoreMode> {
    log::info!("Restore mode:");
    println!("  1. skip     - Skip workflows that already exist (default)");
    println!("  2. update   - Update existing workflows with backup data");
    println!("  3. rename   - Create new workflows with renamed duplicates");

    loop {
        let choice = prompt("Select mode (1-3) or press Enter for default: ")?;
        match choice.as_str() {
            "" | "1" => return Ok(RestoreMode::Skip),
            "2" => return Ok(RestoreMode::Update),
            "3" => return Ok(RestoreMode::Rename),
            other => {
                if let Ok(mode) = other.parse() {
                    return Ok(mode);
                }
                log::error!("Invalid selection");
            }
        }
    }
}

fn confirm(question: &str) -> Result<bool> {
    let answer = prompt(question)?;
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
}

fn prompt(question: &str) -> Result<String> {
    print!("{}", question);
    std::io::stdout().flush()?;

    let mut line = String::new();
    let bytes = std::io::stdin().read_line(&mut line)?;
    if bytes == 0 {
        eyre::bail!("stdin closed");
    }
    Ok(line.trim().to_string())
}

fn print_restore_summary(summary: &RestoreSummary, target: &str) {
    log::info!("Restore complete");
    log::info!("Total workflows: {}", summary.total);
    if summary.created > 0 {
        log::info!("Created: {}", summary.created.to_string().green());
    }
    if summary.updated > 0 {
        log::info!("Updated: {}", summary.updated.to_string().green());
    }
    if summary.renamed > 0 {
        log::info!("Renamed: {}", summary.renamed.to_string().green());
    }
    if summary.skipped > 0 {
        log::info!("Skipped: {}", summary.skipped.to_string().cyan());
    }
    if summary.failed > 0 {
        log::error!("Failed: {}", summary.failed.to_string().red());
    }
    log::info!("Target: {}", target.bright_black());
}
