//! Application configuration
//!
//! Configuration loaded from .gh-caretaker.toml file. Every field has a
//! default, so a partial (or missing) file is fine. CLI flags override the
//! values loaded here.

use crate::duration::serde_duration;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Placeholder replaced by the target status in `update_comment`
pub const STATUS_PLACEHOLDER: &str = "{status}";

/// Application configuration loaded from .gh-caretaker.toml
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Label marking a pull request as already processed by a scan
    #[serde(default = "default_processed_label")]
    pub processed_label: String,

    /// How long a pull request or project item must be untouched to count as stale
    #[serde(default = "default_stale_interval", with = "serde_duration")]
    pub stale_interval: Duration,

    /// Status `/review` moves closing issues to when no `status=` is given
    #[serde(default = "default_review_status")]
    pub review_status: String,

    /// Comment posted on a pull request after a scan processed it
    #[serde(default = "default_scan_comment")]
    pub scan_comment: String,

    /// Comment posted when a pull request update moved its issues;
    /// `{status}` is replaced by the target status
    #[serde(default = "default_update_comment")]
    pub update_comment: String,

    /// Project boards belong to an organization rather than a user
    #[serde(default)]
    pub is_organization: bool,

    /// Never post confirmation comments
    #[serde(default)]
    pub disable_comments: bool,

    /// Also move closed issues and pull requests
    #[serde(default)]
    pub move_closed: bool,
}

fn default_processed_label() -> String {
    "caretaker-processed".to_string()
}

fn default_stale_interval() -> Duration {
    Duration::from_secs(24 * 60 * 60)
}

fn default_review_status() -> String {
    "In Review".to_string()
}

fn default_scan_comment() -> String {
    "Pull request successfully processed by Caretaker.".to_string()
}

fn default_update_comment() -> String {
    "Update detected, any open associated issue has been transfer to {status}.".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            processed_label: default_processed_label(),
            stale_interval: default_stale_interval(),
            review_status: default_review_status(),
            scan_comment: default_scan_comment(),
            update_comment: default_update_comment(),
            is_organization: false,
            disable_comments: false,
            move_closed: false,
        }
    }
}

impl AppConfig {
    /// Load config from CWD first, then home directory, or use defaults
    pub fn load() -> Self {
        if let Some(content) = crate::load_config_file() {
            match toml::from_str(&content) {
                Ok(config) => {
                    log::info!("Loaded app config from file");
                    return config;
                }
                Err(e) => {
                    log::warn!("Failed to parse config file: {}", e);
                }
            }
        }

        log::debug!("Using default app config");
        Self::default()
    }

    /// Load config from an explicit path
    ///
    /// Unlike `load`, a missing or malformed file is an error here.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        log::info!("Loaded app config from {}", path.display());
        Ok(config)
    }

    /// Render the update comment for the given target status
    pub fn update_comment_for(&self, status: &str) -> String {
        self.update_comment.replace(STATUS_PLACEHOLDER, status)
    }
}
