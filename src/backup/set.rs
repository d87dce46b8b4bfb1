//! Backup set discovery and reading
//!
//! A backup set is one `backup_<timestamp>` directory produced by a
//! backup run. This module lists available sets under the backup root,
//! enumerates the workflow files inside one, and parses individual
//! files back into payloads for restore.

use eyre::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// One discovered backup directory
#[derive(Debug, Clone)]
pub struct BackupSummary {
    pub path: PathBuf,
    /// Directory name, e.g. `backup_20260112_111221`
    pub name: String,
    /// Workflow count from the set's index, when readable
    pub workflow_count: Option<usize>,
}

/// List backup directories under `base`, newest first.
///
/// Only directories named `backup_*` count; the timestamped naming makes
/// reverse-lexicographic order chronological.
pub fn list_backups(base: impl AsRef<Path>) -> Result<Vec<BackupSummary>> {
    let base = base.as_ref();
    if !base.exists() {
        eyre::bail!("Backup directory not found: {}", base.display());
    }

    let mut backups = Vec::new();
    for entry in std::fs::read_dir(base)
        .with_context(|| format!("Failed to read backup directory: {}", base.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if path.is_dir() && name.starts_with("backup_") {
            let workflow_count = super::BackupIndex::read(&path)
                .ok()
                .map(|index| index.backup_info.total_workflows);
            backups.push(BackupSummary {
                name: name.to_string(),
                path,
                workflow_count,
            });
        }
    }

    backups.sort_by(|a, b| b.name.cmp(&a.name));
    Ok(backups)
}

/// Most recent backup directory under `base`, if any.
pub fn latest_backup(base: impl AsRef<Path>) -> Result<Option<BackupSummary>> {
    Ok(list_backups(base)?.into_iter().next())
}

/// Enumerate workflow files in a backup set, sorted by path.
///
/// Walks the owner/tag hierarchy recursively, keeping `.json` files and
/// skipping the index, README, and hidden files.
pub fn workflow_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.exists() {
        eyre::bail!("Backup directory not found: {}", dir.display());
    }

    let mut files = Vec::new();
    collect_workflow_files(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_workflow_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if name.starts_with('.') {
            continue;
        }

        if path.is_dir() {
            collect_workflow_files(&path, files)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("json")
            && name != "index.json"
        {
            files.push(path);
        }
    }

    Ok(())
}

/// One parsed backup file
#[derive(Debug, Clone)]
pub struct BackupFile {
    /// Metadata block, present in files written by this tool
    pub metadata: Option<Value>,
    /// The workflow payload to restore
    pub workflow: Value,
}

impl BackupFile {
    /// Workflow name from the payload, `"Unnamed"` when absent
    pub fn workflow_name(&self) -> &str {
        self.workflow
            .get("name")
            .and_then(|n| n.as_str())
            .unwrap_or("Unnamed")
    }
}

/// Parse one backup file.
///
/// Accepts both the `{metadata, workflow}` envelope this tool writes and
/// bare workflow exports, so hand-copied files restore too.
pub fn read_backup_file(path: impl AsRef<Path>) -> Result<BackupFile> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read backup file: {}", path.display()))?;
    let mut value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse backup file: {}", path.display()))?;

    match value.get("workflow") {
        Some(_) => {
            let workflow = value["workflow"].take();
            let metadata = value.get_mut("metadata").map(|m| m.take());
            Ok(BackupFile { metadata, workflow })
        }
        None => Ok(BackupFile {
            metadata: None,
            workflow: value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_file(path: &Path, value: &Value) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    }

    #[test]
    fn test_list_backups_newest_first() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("backup_20260101_000000")).unwrap();
        std::fs::create_dir(temp.path().join("backup_20260301_000000")).unwrap();
        std::fs::create_dir(temp.path().join("backup_20260201_000000")).unwrap();
        std::fs::create_dir(temp.path().join("not_a_backup")).unwrap();

        let backups = list_backups(temp.path()).unwrap();
        let names: Vec<_> = backups.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "backup_20260301_000000",
                "backup_20260201_000000",
                "backup_20260101_000000"
            ]
        );

        let latest = latest_backup(temp.path()).unwrap().unwrap();
        assert_eq!(latest.name, "backup_20260301_000000");
    }

    #[test]
    fn test_list_backups_missing_base() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        assert!(list_backups(&missing).is_err());
    }

    #[test]
    fn test_workflow_count_from_index() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("backup_20260101_000000");
        std::fs::create_dir(&dir).unwrap();
        write_file(
            &dir.join("index.json"),
            &json!({
                "backup_info": {
                    "timestamp": "2026-01-01T00:00:00+00:00",
                    "n8n_instance": "https://n8n.example.com/",
                    "total_workflows": 7,
                    "successful_downloads": 7,
                    "failed_downloads": 0
                },
                "folder_structure": {},
                "workflows_by_folder": {}
            }),
        );

        let backups = list_backups(temp.path()).unwrap();
        assert_eq!(backups[0].workflow_count, Some(7));
    }

    #[test]
    fn test_workflow_files_skips_artifacts() {
        let temp = TempDir::new().unwrap();
        write_file(&temp.path().join("Team/ops/one_wf-1.json"), &json!({}));
        write_file(&temp.path().join("Team/No Tag/two_wf-2.json"), &json!({}));
        write_file(&temp.path().join("index.json"), &json!({}));
        std::fs::write(temp.path().join("README.md"), "# readme").unwrap();
        write_file(&temp.path().join("Team/.hidden.json"), &json!({}));

        let files = workflow_files(temp.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| {
            let name = f.file_name().unwrap().to_str().unwrap();
            name != "index.json" && !name.starts_with('.')
        }));
    }

    #[test]
    fn test_read_enveloped_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("wf.json");
        write_file(
            &path,
            &json!({
                "metadata": {"workflow_id": "wf-1"},
                "workflow": {"name": "One", "nodes": []}
            }),
        );

        let file = read_backup_file(&path).unwrap();
        assert_eq!(file.workflow_name(), "One");
        assert_eq!(file.metadata.unwrap()["workflow_id"], "wf-1");
    }

    #[test]
    fn test_read_bare_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("wf.json");
        write_file(&path, &json!({"name": "Bare", "nodes": []}));

        let file = read_backup_file(&path).unwrap();
        assert_eq!(file.workflow_name(), "Bare");
        assert!(file.metadata.is_none());
    }

    #[test]
    fn test_read_invalid_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(read_backup_file(&path).is_err());
    }
}
