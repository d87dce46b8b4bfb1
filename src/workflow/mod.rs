//! Workflow domain types
//!
//! Typed summary records from the n8n list API plus helpers for deriving
//! the owner label and node count from a raw workflow payload.

mod record;

pub use record::{NO_OWNER, TagRef, Workflow, node_count, owner_label, sanitize_filename};
