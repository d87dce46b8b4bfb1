//! Owner/tag classification
//!
//! Groups workflow summaries into a two-level hierarchy keyed by
//! `(owner label, tag name)`. A workflow with N tags is copied into N
//! buckets; a workflow with no tags lands in the "No Tag" bucket once.
//! Archived workflows are dropped before grouping.

use crate::workflow::{Workflow, sanitize_filename};
use owo_colors::OwoColorize;
use std::collections::BTreeMap;

/// Bucket label for workflows without any tag
pub const NO_TAG: &str = "No Tag";

/// Composite classification key: owner label then tag name.
///
/// Both components are filesystem-sanitized at construction so the key
/// doubles as the relative folder path inside a backup.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FolderKey {
    pub owner: String,
    pub tag: String,
}

impl FolderKey {
    pub fn new(owner: &str, tag: &str) -> Self {
        Self {
            owner: sanitize_filename(owner),
            tag: sanitize_filename(tag),
        }
    }

    /// Relative path of this bucket inside a backup directory
    pub fn relative_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.owner).join(&self.tag)
    }
}

impl std::fmt::Display for FolderKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.tag)
    }
}

/// Result of one classification pass
#[derive(Debug, Default)]
pub struct Classification {
    /// Owner/tag buckets, each an independently owned list of copies
    pub folders: BTreeMap<FolderKey, Vec<Workflow>>,
    /// Workflows that survived the archived filter
    pub kept: usize,
    /// Archived workflows dropped from the run
    pub archived: usize,
}

impl Classification {
    /// Total record copies across all buckets (fan-out included)
    pub fn copy_count(&self) -> usize {
        self.folders.values().map(|w| w.len()).sum()
    }
}

/// Classify workflows into owner/tag buckets.
///
/// `owner_of` resolves the owner label for a workflow; callers supply a
/// lookup backed by fetched workflow payloads, tests supply a closure.
pub fn classify<F>(workflows: Vec<Workflow>, owner_of: F) -> Classification
where
    F: Fn(&Workflow) -> String,
{
    let total = workflows.len();
    let mut classification = Classification::default();

    for workflow in workflows {
        if workflow.archived {
            classification.archived += 1;
            continue;
        }
        classification.kept += 1;

        let owner = owner_of(&workflow);
        let tags = workflow.tag_names();

        if tags.is_empty() {
            log::info!(
                "  [{}/{}] {}",
                owner.cyan(),
                NO_TAG.cyan(),
                workflow.name
            );
            classification
                .folders
                .entry(FolderKey::new(&owner, NO_TAG))
                .or_default()
                .push(workflow);
        } else {
            for tag in &tags {
                log::info!("  [{}/{}] {}", owner.cyan(), tag.cyan(), workflow.name);
                classification
                    .folders
                    .entry(FolderKey::new(&owner, tag))
                    .or_default()
                    .push(workflow.clone());
            }
        }
    }

    log::info!("Found {} active workflow(s)", classification.kept);
    if classification.archived > 0 {
        log::info!(
            "Skipping {} archived workflow(s)",
            classification.archived.to_string().yellow()
        );
    }

    debug_assert_eq!(total, classification.kept + classification.archived);

    classification
}
