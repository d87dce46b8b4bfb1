//! Restore modes and the per-record decision
//!
//! The name-collision handling is a closed enumeration: a record either
//! has no remote counterpart (create) or collides, in which case the
//! selected mode picks skip, update, or rename.

use clap::ValueEnum;
use std::str::FromStr;

/// How to handle a local record whose name already exists remotely
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum RestoreMode {
    /// Leave the existing workflow untouched
    #[default]
    Skip,
    /// Overwrite the existing workflow with the backup data
    Update,
    /// Create a new workflow under a timestamped name
    Rename,
}

impl std::fmt::Display for RestoreMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::Update => write!(f, "update"),
            Self::Rename => write!(f, "rename"),
        }
    }
}

impl FromStr for RestoreMode {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "update" => Ok(Self::Update),
            "rename" => Ok(Self::Rename),
            _ => Err(()),
        }
    }
}

/// Action chosen for one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreAction {
    /// No remote workflow with this name: create it
    Create,
    /// Name exists and mode is skip: no remote call
    Skip,
    /// Name exists and mode is update: overwrite the matched workflow
    Update { id: String },
    /// Name exists and mode is rename: create under a suffixed name
    Rename,
}

/// Decide the action for a record given its remote name match.
pub fn decide(mode: RestoreMode, existing_id: Option<&str>) -> RestoreAction {
    match (existing_id, mode) {
        (None, _) => RestoreAction::Create,
        (Some(_), RestoreMode::Skip) => RestoreAction::Skip,
        (Some(id), RestoreMode::Update) => RestoreAction::Update { id: id.to_string() },
        (Some(_), RestoreMode::Rename) => RestoreAction::Rename,
    }
}
