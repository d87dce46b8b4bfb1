//! Runtime configuration
//!
//! Configuration is read from the process environment. `main` sources a
//! dotenv file first without overriding variables that are already set,
//! so an explicit environment variable always wins over the file.
//!
//! Keys:
//! - `N8N_API_URL`: base URL of the n8n instance (required)
//! - `N8N_API_KEY`: API key sent as `X-N8N-API-KEY` (required)
//! - `BACKUP_DIR`: backup root (optional, defaults to
//!   `~/n8n-workflows-backup`)

use eyre::{Context, Result};
use std::path::PathBuf;
use url::Url;

/// Resolved configuration for one run
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the n8n instance
    pub api_url: Url,
    /// API key for the `X-N8N-API-KEY` header
    pub api_key: String,
    /// Root directory holding timestamped backup directories
    pub backup_dir: PathBuf,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    /// Returns an error if a required key is missing or the URL does not
    /// parse. Missing configuration is reported before any network call.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// The lookup seam keeps configuration testable without mutating the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url_str = lookup("N8N_API_URL").ok_or_else(|| {
            eyre::eyre!("N8N_API_URL not configured. Set it in .env or the environment.")
        })?;
        let api_url = Url::parse(&url_str)
            .with_context(|| format!("Invalid N8N_API_URL: {}", url_str))?;

        let api_key = lookup("N8N_API_KEY").filter(|key| !key.is_empty()).ok_or_else(|| {
            eyre::eyre!("N8N_API_KEY not configured. Set it in .env or the environment.")
        })?;

        let backup_dir = match lookup("BACKUP_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("n8n-workflows-backup"),
        };

        Ok(Self {
            api_url,
            api_key,
            backup_dir,
        })
    }
}
