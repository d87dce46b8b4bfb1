//! n8n HTTP client
//!
//! Wraps `reqwest` with the `X-N8N-API-KEY` header and the `/api/v1`
//! workflow endpoints. Listing follows cursor pagination until the
//! server stops returning a `nextCursor`.

use super::WorkflowApi;
use crate::workflow::Workflow;
use eyre::{Context, Result, eyre};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

/// One page of the workflows list endpoint
#[derive(Debug, Deserialize)]
struct WorkflowPage {
    #[serde(default)]
    data: Vec<Workflow>,
    #[serde(rename = "nextCursor", default)]
    next_cursor: Option<String>,
}

/// n8n API client
///
/// # Example
/// ```no_run
/// use n8n_backup_manager::client::{N8n, WorkflowApi};
/// use url::Url;
///
/// # async fn example() -> eyre::Result<()> {
/// let url = Url::parse("https://n8n.example.com")?;
/// let client = N8n::try_new(url, "api-key")?;
/// let workflows = client.list_workflows().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct N8n {
    client: Client,
    url: Url,
}

impl N8n {
    /// Create a new client for the given base URL and API key.
    ///
    /// Every request carries the `X-N8N-API-KEY` header; n8n has no other
    /// authentication scheme for its public API.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built or the API key
    /// is not a valid header value.
    pub fn try_new(url: Url, api_key: &str) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("X-N8N-API-KEY", api_key.parse()?);
        headers.insert(reqwest::header::CONTENT_TYPE, "application/json".parse()?);
        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self { client, url })
    }

    /// Get the base URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.url
            .join(path)
            .map_err(|e| eyre!("Invalid API path '{}': {}", path, e))
    }

    /// Verify connectivity and authentication.
    ///
    /// Requests a single-item workflow page; any non-success status is an
    /// error carrying the response body.
    pub async fn test_connection(&self) -> Result<()> {
        let url = self.endpoint("/api/v1/workflows")?;
        let response = self
            .client
            .get(url)
            .query(&[("limit", "1")])
            .send()
            .await
            .context("Failed to reach n8n instance")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            eyre::bail!("Authorization check failed ({}): {}", status, body);
        }

        Ok(())
    }

    async fn fetch_page(&self, cursor: Option<&str>) -> Result<WorkflowPage> {
        let url = self.endpoint("/api/v1/workflows")?;
        let mut request = self.client.get(url).query(&[("limit", "100")]);
        if let Some(cursor) = cursor {
            request = request.query(&[("cursor", cursor)]);
        }

        let response = request
            .send()
            .await
            .context("Failed to fetch workflows page")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            eyre::bail!("Failed to list workflows ({}): {}", status, body);
        }

        response
            .json()
            .await
            .context("Failed to parse workflows page")
    }
}

impl WorkflowApi for N8n {
    async fn list_workflows(&self) -> Result<Vec<Workflow>> {
        let mut workflows = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self.fetch_page(cursor.as_deref()).await?;
            let fetched = page.data.len();
            workflows.extend(page.data);
            log::debug!(
                "Fetched {} workflow(s) (total: {})",
                fetched,
                workflows.len()
            );

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(workflows)
    }

    async fn get_workflow(&self, id: &str) -> Result<Value> {
        let url = self.endpoint(&format!("/api/v1/workflows/{}", id))?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch workflow '{}'", id))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            eyre::bail!("Failed to fetch workflow '{}' ({}): {}", id, status, body);
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse workflow '{}' response", id))
    }

    async fn create_workflow(&self, body: &Value) -> Result<Value> {
        let url = self.endpoint("/api/v1/workflows")?;
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send create request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            eyre::bail!("Failed to create workflow ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse create response")
    }

    async fn update_workflow(&self, id: &str, body: &Value) -> Result<Value> {
        let url = self.endpoint(&format!("/api/v1/workflows/{}", id))?;
        let response = self
            .client
            .put(url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send update request for '{}'", id))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            eyre::bail!("Failed to update workflow '{}' ({}): {}", id, status, body);
        }

        response.json().await.context("Failed to parse update response")
    }
}

impl std::fmt::Display for N8n {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let url = Url::parse("http://localhost:5678").unwrap();
        let client = N8n::try_new(url, "test-key").unwrap();
        assert_eq!(client.url().as_str(), "http://localhost:5678/");
    }

    #[test]
    fn test_display() {
        let url = Url::parse("https://n8n.example.com").unwrap();
        let client = N8n::try_new(url, "test-key").unwrap();
        assert_eq!(format!("{}", client), "https://n8n.example.com/");
    }

    #[test]
    fn test_endpoint_join() {
        let url = Url::parse("https://n8n.example.com").unwrap();
        let client = N8n::try_new(url, "test-key").unwrap();
        let endpoint = client.endpoint("/api/v1/workflows/abc").unwrap();
        assert_eq!(
            endpoint.as_str(),
            "https://n8n.example.com/api/v1/workflows/abc"
        );
    }

    #[test]
    fn test_page_parsing() {
        let page: WorkflowPage = serde_json::from_str(
            r#"{"data": [{"id": "wf-1", "name": "One"}], "nextCursor": "abc"}"#,
        )
        .unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.next_cursor.as_deref(), Some("abc"));

        let last: WorkflowPage = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(last.data.is_empty());
        assert!(last.next_cursor.is_none());
    }
}
