//! Reconciliation of a backup set against the live instance
//!
//! Fetches the remote workflow list once, builds a name index, and walks
//! the backup's files one at a time. Each record gets exactly one remote
//! call (or none, for skips); a failed call is recorded and the run
//! moves on.

use super::{RecordResult, RestoreAction, RestoreMode, RestoreOutcome, RestoreSummary, decide};
use crate::backup::{read_backup_file, workflow_files};
use crate::client::WorkflowApi;
use eyre::Result;
use owo_colors::OwoColorize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::Path;

/// Fields the create endpoint accepts. Everything else the backup file
/// carries (ids, tags, timestamps, sharing) is rejected by the API.
const CREATE_FIELDS: [&str; 3] = ["name", "nodes", "connections"];

/// Build a create body from a backup payload: name, nodes, connections,
/// and an empty settings object.
pub fn clean_for_create(workflow: &Value) -> Value {
    let mut body = serde_json::Map::new();
    for field in CREATE_FIELDS {
        if let Some(value) = workflow.get(field) {
            body.insert(field.to_string(), value.clone());
        }
    }
    body.insert("settings".to_string(), json!({}));
    Value::Object(body)
}

/// Build an update body from a backup payload: name, nodes, connections.
pub fn update_body(workflow: &Value) -> Value {
    let mut body = serde_json::Map::new();
    for field in CREATE_FIELDS {
        if let Some(value) = workflow.get(field) {
            body.insert(field.to_string(), value.clone());
        }
    }
    Value::Object(body)
}

/// Reconciler for one restore run
pub struct Reconciler<'a, A> {
    api: &'a A,
    mode: RestoreMode,
    /// Timestamp suffix shared by every rename in this run
    rename_stamp: String,
}

impl<'a, A: WorkflowApi> Reconciler<'a, A> {
    /// Create a reconciler. The rename suffix is fixed from `started`,
    /// so every renamed record in one run carries the same timestamp.
    pub fn new(api: &'a A, mode: RestoreMode, started: chrono::DateTime<chrono::Local>) -> Self {
        Self {
            api,
            mode,
            rename_stamp: started.format("%Y%m%d_%H%M%S").to_string(),
        }
    }

    /// The name a colliding record is created under in rename mode
    pub fn renamed(&self, name: &str) -> String {
        format!("{} (restored {})", name, self.rename_stamp)
    }

    /// Restore every workflow file in `backup_dir`.
    ///
    /// Fatal errors are an unreadable backup directory and a failed
    /// remote list fetch; everything past that point is contained per
    /// record.
    pub async fn restore_backup(&self, backup_dir: impl AsRef<Path>) -> Result<RestoreSummary> {
        let files = workflow_files(backup_dir)?;
        let mut summary = RestoreSummary::default();

        if files.is_empty() {
            log::warn!("No workflow files found in backup directory");
            return Ok(summary);
        }

        log::info!("Found {} workflow file(s) to restore", files.len());

        let existing = self.existing_by_name().await?;

        log::info!("Restoring workflows (mode: {})...", self.mode.cyan());

        for path in files {
            let result = self.restore_file(&path, &existing).await;
            if let RestoreOutcome::Failed(message) = &result.outcome {
                log::error!("✗ {}: {}", result.name, message);
            }
            summary.record(result);
        }

        Ok(summary)
    }

    /// Fetch the remote list once and index it by name.
    ///
    /// Names are compared by exact, case-sensitive equality. When the
    /// instance holds duplicate names, only one entry survives (which
    /// one is unspecified) — a known limitation, kept as-is.
    async fn existing_by_name(&self) -> Result<HashMap<String, String>> {
        log::info!("Fetching existing workflows from n8n...");
        let workflows = self.api.list_workflows().await?;

        let mut existing = HashMap::new();
        for workflow in workflows {
            if !workflow.name.is_empty() && !workflow.id.is_empty() {
                existing.insert(workflow.name, workflow.id);
            }
        }

        log::info!("Found {} existing workflow(s)", existing.len());
        Ok(existing)
    }

    async fn restore_file(
        &self,
        path: &Path,
        existing: &HashMap<String, String>,
    ) -> RecordResult {
        let file = match read_backup_file(path) {
            Ok(file) => file,
            Err(e) => {
                return RecordResult {
                    file: path.to_path_buf(),
                    name: path
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .unwrap_or("unknown")
                        .to_string(),
                    outcome: RestoreOutcome::Failed(format!("{:#}", e)),
                };
            }
        };

        let name = file.workflow_name().to_string();
        let action = decide(self.mode, existing.get(&name).map(String::as_str));

        let outcome = match action {
            RestoreAction::Skip => {
                log::info!("  ⊘ Skipped: {} (already exists)", name);
                RestoreOutcome::Skipped
            }
            RestoreAction::Create => {
                match self.api.create_workflow(&clean_for_create(&file.workflow)).await {
                    Ok(_) => {
                        log::info!("  + Created: {}", name.green());
                        RestoreOutcome::Created
                    }
                    Err(e) => RestoreOutcome::Failed(format!("{:#}", e)),
                }
            }
            RestoreAction::Update { id } => {
                match self.api.update_workflow(&id, &update_body(&file.workflow)).await {
                    Ok(_) => {
                        log::info!("  ↻ Updated: {}", name.green());
                        RestoreOutcome::Updated
                    }
                    Err(e) => RestoreOutcome::Failed(format!("{:#}", e)),
                }
            }
            RestoreAction::Rename => {
                let new_name = self.renamed(&name);
                let mut body = clean_for_create(&file.workflow);
                body["name"] = json!(new_name);
                match self.api.create_workflow(&body).await {
                    Ok(_) => {
                        log::info!("  + Created: {}", new_name.green());
                        RestoreOutcome::Renamed
                    }
                    Err(e) => RestoreOutcome::Failed(format!("{:#}", e)),
                }
            }
        };

        RecordResult {
            file: path.to_path_buf(),
            name,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::Workflow;
    use chrono::TimeZone;

    struct NullApi;

    impl WorkflowApi for NullApi {
        async fn list_workflows(&self) -> Result<Vec<Workflow>> {
            Ok(Vec::new())
        }
        async fn get_workflow(&self, _id: &str) -> Result<Value> {
            eyre::bail!("not implemented")
        }
        async fn create_workflow(&self, _body: &Value) -> Result<Value> {
            eyre::bail!("not implemented")
        }
        async fn update_workflow(&self, _id: &str, _body: &Value) -> Result<Value> {
            eyre::bail!("not implemented")
        }
    }

    #[test]
    fn test_clean_for_create() {
        let payload = json!({
            "id": "wf-1",
            "name": "One",
            "nodes": [{"name": "Start"}],
            "connections": {"Start": {}},
            "settings": {"executionOrder": "v1"},
            "tags": [{"name": "ops"}],
            "createdAt": "2026-01-01T00:00:00.000Z"
        });

        let body = clean_for_create(&payload);
        let object = body.as_object().unwrap();

        assert_eq!(object.len(), 4);
        assert_eq!(body["name"], "One");
        assert_eq!(body["nodes"], payload["nodes"]);
        assert_eq!(body["connections"], payload["connections"]);
        // Settings is always the empty object; ids and tags never go out
        assert_eq!(body["settings"], json!({}));
        assert!(object.get("id").is_none());
        assert!(object.get("tags").is_none());
    }

    #[test]
    fn test_update_body() {
        let payload = json!({
            "id": "wf-1",
            "name": "One",
            "nodes": [],
            "connections": {},
            "settings": {"executionOrder": "v1"}
        });

        let body = update_body(&payload);
        let object = body.as_object().unwrap();

        assert_eq!(object.len(), 3);
        assert!(object.contains_key("name"));
        assert!(object.contains_key("nodes"));
        assert!(object.contains_key("connections"));
        assert!(!object.contains_key("settings"));
    }

    #[test]
    fn test_rename_suffix_format() {
        let started = chrono::Local
            .with_ymd_and_hms(2026, 8, 6, 10, 30, 0)
            .unwrap();
        let reconciler = Reconciler::new(&NullApi, RestoreMode::Rename, started);

        assert_eq!(
            reconciler.renamed("Daily Report"),
            "Daily Report (restored 20260806_103000)"
        );
    }
}
