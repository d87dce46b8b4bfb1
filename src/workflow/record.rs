//! Workflow summary records
//!
//! The list endpoint returns lightweight summaries which drive
//! classification and indexing. Full workflow payloads stay as raw
//! `serde_json::Value` so backup files round-trip exactly what the API
//! returned.

use serde::Deserialize;
use serde_json::Value;

/// Owner label used when a workflow has no resolvable project.
pub const NO_OWNER: &str = "No Owner";

fn default_name() -> String {
    "Unnamed".to_string()
}

/// Tag reference as returned by the workflows list API
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TagRef {
    /// Tag display name (second-level classification key)
    pub name: String,
}

/// Workflow summary from `GET /api/v1/workflows`
///
/// Unknown fields are ignored; summaries are never sent back to the API.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Workflow {
    /// Remote workflow identifier
    pub id: String,
    /// Workflow name (sole identity key during restore)
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub active: bool,
    /// Archived workflows are excluded from backups entirely
    #[serde(rename = "isArchived", default)]
    pub archived: bool,
    #[serde(default)]
    pub tags: Vec<TagRef>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<String>,
}

impl Workflow {
    /// Tag names in their API order
    pub fn tag_names(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.name.clone()).collect()
    }
}

/// Derive the owner label from a full workflow payload.
///
/// The label is `shared[0].project.name`. Personal projects embed the
/// owner's email as `Name <email>`; the email portion is stripped.
/// Returns [`NO_OWNER`] when the payload carries no project.
pub fn owner_label(detail: &Value) -> String {
    let project = detail
        .get("shared")
        .and_then(|s| s.get(0))
        .and_then(|s| s.get("project"));

    let Some(project) = project else {
        return NO_OWNER.to_string();
    };

    let name = match project.get("name").and_then(|n| n.as_str()) {
        Some(name) => name,
        None => return NO_OWNER.to_string(),
    };

    let is_personal = project
        .get("type")
        .and_then(|t| t.as_str())
        .is_some_and(|t| t == "personal");

    if is_personal && name.contains('<') {
        name.split('<').next().unwrap_or(name).trim().to_string()
    } else {
        name.to_string()
    }
}

/// Number of nodes in a full workflow payload, 0 when absent
pub fn node_count(detail: &Value) -> usize {
    detail
        .get("nodes")
        .and_then(|n| n.as_array())
        .map(|n| n.len())
        .unwrap_or(0)
}

/// Replace filesystem-unsafe characters with underscores and trim
pub fn sanitize_filename(name: &str) -> String {
    name.replace(['<', '>', ':', '"', '/', '\\', '|', '?', '*'], "_")
        .trim()
        .to_string()
}
