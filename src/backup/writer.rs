//! Backup file writing
//!
//! One backup run owns one `backup_<timestamp>` directory. Each workflow
//! copy is written as `<owner>/<tag>/<name>_<id>.json` containing a
//! metadata block plus the raw workflow payload exactly as the API
//! returned it, so the file is independently re-importable.

use super::FolderKey;
use crate::workflow::{Workflow, node_count};
use eyre::{Context, Result};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

/// Writer for one timestamped backup directory
pub struct BackupWriter {
    root: PathBuf,
}

impl BackupWriter {
    /// Create the `backup_<timestamp>` directory under `base`.
    pub fn create(base: impl AsRef<Path>, timestamp: &str) -> Result<Self> {
        let root = base.as_ref().join(format!("backup_{}", timestamp));
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create backup directory: {}", root.display()))?;
        Ok(Self { root })
    }

    /// Open an existing directory as a backup root.
    pub fn open(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// The backup directory path
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Write one workflow copy into its owner/tag bucket.
    ///
    /// The file carries a `metadata` block with derived fields and the
    /// untouched payload under `workflow`.
    ///
    /// # Errors
    /// Returns an error if the bucket directory cannot be created or the
    /// file cannot be written; callers contain the failure per record.
    pub fn write_workflow(
        &self,
        key: &FolderKey,
        workflow: &Workflow,
        detail: &Value,
        captured_at: &str,
    ) -> Result<PathBuf> {
        let folder = self.root.join(key.relative_path());
        std::fs::create_dir_all(&folder)
            .with_context(|| format!("Failed to create folder: {}", folder.display()))?;

        let path = folder.join(backup_filename(workflow));

        let envelope = json!({
            "metadata": {
                "downloaded_at": captured_at,
                "workflow_id": workflow.id,
                "workflow_name": workflow.name,
                "active": workflow.active,
                "archived": workflow.archived,
                "created_at": workflow.created_at,
                "updated_at": workflow.updated_at,
                "tags": workflow.tag_names(),
                "node_count": node_count(detail),
            },
            "workflow": detail,
        });

        let content = serde_json::to_string_pretty(&envelope)?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to save {}", path.display()))?;

        Ok(path)
    }
}

/// Filename for a workflow copy: sanitized name plus id to avoid collisions
pub fn backup_filename(workflow: &Workflow) -> String {
    format!(
        "{}_{}.json",
        crate::workflow::sanitize_filename(&workflow.name),
        workflow.id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::TagRef;
    use tempfile::TempDir;

    fn sample_workflow() -> Workflow {
        Workflow {
            id: "wf-1".to_string(),
            name: "Daily Report".to_string(),
            active: true,
            archived: false,
            tags: vec![TagRef {
                name: "reports".to_string(),
            }],
            created_at: Some("2026-01-12T11:12:21.000Z".to_string()),
            updated_at: None,
        }
    }

    #[test]
    fn test_create_backup_dir() {
        let temp = TempDir::new().unwrap();
        let writer = BackupWriter::create(temp.path(), "20260101_120000").unwrap();
        assert!(writer.path().ends_with("backup_20260101_120000"));
        assert!(writer.path().is_dir());
    }

    #[test]
    fn test_write_workflow_envelope() {
        let temp = TempDir::new().unwrap();
        let writer = BackupWriter::open(temp.path());
        let workflow = sample_workflow();
        let detail = json!({
            "id": "wf-1",
            "name": "Daily Report",
            "nodes": [{"name": "Start"}, {"name": "HTTP Request"}],
            "connections": {"Start": {}},
            "settings": {"executionOrder": "v1"}
        });

        let key = FolderKey::new("Team", "reports");
        let path = writer
            .write_workflow(&key, &workflow, &detail, "2026-08-06T10:00:00")
            .unwrap();

        assert!(path.ends_with("Team/reports/Daily Report_wf-1.json"));

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let metadata = &written["metadata"];
        assert_eq!(metadata["downloaded_at"], "2026-08-06T10:00:00");
        assert_eq!(metadata["workflow_id"], "wf-1");
        assert_eq!(metadata["workflow_name"], "Daily Report");
        assert_eq!(metadata["active"], true);
        assert_eq!(metadata["archived"], false);
        assert_eq!(metadata["tags"], json!(["reports"]));
        assert_eq!(metadata["node_count"], 2);

        // Payload section is exactly what the API returned
        assert_eq!(written["workflow"], detail);
    }

    #[test]
    fn test_filename_sanitized() {
        let mut workflow = sample_workflow();
        workflow.name = "a/b: report?".to_string();
        assert_eq!(backup_filename(&workflow), "a_b_ report__wf-1.json");
    }
}
