//! Workflow API trait
//!
//! The remote operations the backup and restore pipelines depend on.
//! `N8n` implements this against a live instance; tests implement it
//! with in-memory state.

use crate::workflow::Workflow;
use eyre::Result;
use serde_json::Value;

/// Remote workflow operations
///
/// Implementors define how to reach the workflow collection:
/// - the n8n REST API
/// - in-memory mocks for tests
pub trait WorkflowApi: Send + Sync {
    /// List every workflow summary, following pagination to the end
    ///
    /// # Errors
    /// Returns an error if any page fails to fetch or parse
    fn list_workflows(&self) -> impl std::future::Future<Output = Result<Vec<Workflow>>> + Send;

    /// Fetch one workflow's full payload by id
    fn get_workflow(&self, id: &str) -> impl std::future::Future<Output = Result<Value>> + Send;

    /// Create a workflow from the given body, returning the created payload
    fn create_workflow(
        &self,
        body: &Value,
    ) -> impl std::future::Future<Output = Result<Value>> + Send;

    /// Update the workflow with the given id, returning the updated payload
    fn update_workflow(
        &self,
        id: &str,
        body: &Value,
    ) -> impl std::future::Future<Output = Result<Value>> + Send;
}
