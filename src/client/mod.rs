//! n8n client module
//!
//! Provides the `N8n` HTTP client and the `WorkflowApi` trait it
//! implements, which is the seam used to test the backup and restore
//! pipelines without a live instance.

mod api;
mod n8n;

pub use api::WorkflowApi;
pub use n8n::N8n;
