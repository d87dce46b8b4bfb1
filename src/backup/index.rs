//! Backup index artifacts
//!
//! Every backup run ends with two files at its root: `index.json`, the
//! machine-readable manifest of everything successfully written, and
//! `README.md`, a human-readable summary of the same run.

use super::FolderKey;
use crate::workflow::Workflow;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Run-level backup information
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackupInfo {
    /// Capture timestamp, RFC 3339
    pub timestamp: String,
    /// Instance the workflows were fetched from
    pub n8n_instance: String,
    pub total_workflows: usize,
    pub successful_downloads: usize,
    pub failed_downloads: usize,
}

/// Identity of one indexed workflow copy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexedWorkflow {
    pub id: String,
    pub name: String,
    pub active: bool,
    pub tags: Vec<String>,
}

/// Machine-readable manifest of one backup run.
///
/// Only successfully written files are listed; per-record write failures
/// appear in the counts but not in the folder listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackupIndex {
    pub backup_info: BackupInfo,
    /// Folder path → number of workflow files
    pub folder_structure: BTreeMap<String, usize>,
    /// Folder path → workflow identities
    pub workflows_by_folder: BTreeMap<String, Vec<IndexedWorkflow>>,
}

impl BackupIndex {
    pub fn new(timestamp: String, instance: String) -> Self {
        Self {
            backup_info: BackupInfo {
                timestamp,
                n8n_instance: instance,
                total_workflows: 0,
                successful_downloads: 0,
                failed_downloads: 0,
            },
            folder_structure: BTreeMap::new(),
            workflows_by_folder: BTreeMap::new(),
        }
    }

    /// Record one successfully written workflow copy.
    pub fn add(&mut self, folder: &FolderKey, workflow: &Workflow) {
        let folder = folder.to_string();
        *self.folder_structure.entry(folder.clone()).or_insert(0) += 1;
        self.workflows_by_folder
            .entry(folder)
            .or_default()
            .push(IndexedWorkflow {
                id: workflow.id.clone(),
                name: workflow.name.clone(),
                active: workflow.active,
                tags: workflow.tag_names(),
            });
    }

    /// Read an index from `<dir>/index.json`.
    pub fn read(dir: impl AsRef<Path>) -> Result<Self> {
        let path = dir.as_ref().join("index.json");
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read backup index: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse backup index: {}", path.display()))
    }

    /// Write `index.json` and `README.md` into the backup directory.
    pub fn write(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();

        let index_path = dir.join("index.json");
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&index_path, json)
            .with_context(|| format!("Failed to write {}", index_path.display()))?;

        let readme_path = dir.join("README.md");
        std::fs::write(&readme_path, self.render_readme())
            .with_context(|| format!("Failed to write {}", readme_path.display()))?;

        Ok(())
    }

    /// Render the human-readable run summary.
    pub fn render_readme(&self) -> String {
        let date = chrono::DateTime::parse_from_rfc3339(&self.backup_info.timestamp)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|_| self.backup_info.timestamp.clone());

        let mut readme = String::new();
        readme.push_str("# n8n Workflows Backup\n\n");
        readme.push_str(&format!("**Backup Date:** {}\n", date));
        readme.push_str(&format!(
            "**n8n Instance:** {}\n",
            self.backup_info.n8n_instance
        ));
        readme.push_str(&format!(
            "**Total Workflows:** {}\n",
            self.backup_info.total_workflows
        ));
        readme.push_str(&format!(
            "**Successfully Downloaded:** {}\n\n",
            self.backup_info.successful_downloads
        ));
        readme.push_str("## Folder Structure\n\n");

        for (folder, workflows) in &self.workflows_by_folder {
            readme.push_str(&format!(
                "### {} ({} workflows)\n\n",
                folder,
                workflows.len()
            ));
            for workflow in workflows {
                let status = if workflow.active {
                    "✓ Active"
                } else {
                    "○ Inactive"
                };
                readme.push_str(&format!(
                    "- {} **{}** (`{}`)\n",
                    status, workflow.name, workflow.id
                ));
            }
            readme.push('\n');
        }

        readme
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::TagRef;
    use tempfile::TempDir;

    fn sample_workflow(id: &str, name: &str, active: bool) -> Workflow {
        Workflow {
            id: id.to_string(),
            name: name.to_string(),
            active,
            archived: false,
            tags: vec![TagRef {
                name: "ops".to_string(),
            }],
            created_at: None,
            updated_at: None,
        }
    }

    fn sample_index() -> BackupIndex {
        let mut index = BackupIndex::new(
            "2026-08-06T10:00:00+00:00".to_string(),
            "https://n8n.example.com/".to_string(),
        );
        index.backup_info.total_workflows = 2;
        index.backup_info.successful_downloads = 2;
        index.add(&FolderKey::new("Team", "ops"), &sample_workflow("wf-1", "One", true));
        index.add(&FolderKey::new("Team", "ops"), &sample_workflow("wf-2", "Two", false));
        index
    }

    #[test]
    fn test_add_counts_folders() {
        let index = sample_index();
        assert_eq!(index.folder_structure["Team/ops"], 2);
        assert_eq!(index.workflows_by_folder["Team/ops"].len(), 2);
    }

    #[test]
    fn test_write_read_round_trip() {
        let temp = TempDir::new().unwrap();
        let index = sample_index();

        index.write(temp.path()).unwrap();
        assert!(temp.path().join("index.json").exists());
        assert!(temp.path().join("README.md").exists());

        let loaded = BackupIndex::read(temp.path()).unwrap();
        assert_eq!(loaded, index);
    }

    #[test]
    fn test_readme_rendering() {
        let readme = sample_index().render_readme();

        assert!(readme.contains("# n8n Workflows Backup"));
        assert!(readme.contains("**Backup Date:** 2026-08-06 10:00:00"));
        assert!(readme.contains("**n8n Instance:** https://n8n.example.com/"));
        assert!(readme.contains("### Team/ops (2 workflows)"));
        assert!(readme.contains("- ✓ Active **One** (`wf-1`)"));
        assert!(readme.contains("- ○ Inactive **Two** (`wf-2`)"));
    }
}
