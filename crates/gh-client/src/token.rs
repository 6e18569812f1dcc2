//! Token resolution and octocrab construction
//!
//! Builds an authenticated octocrab instance for github.com or a GitHub
//! Enterprise host.

use crate::DEFAULT_HOST;
use anyhow::{Context, Result};
use log::{debug, info};
use octocrab::Octocrab;

/// Resolves the GitHub token for a host
///
/// Tries multiple sources in order:
/// 1. Explicit token (e.g., from `--token`)
/// 2. Host-specific env var (e.g., `GITHUB_TOKEN_GHE_EXAMPLE_COM`)
/// 3. Generic `GITHUB_TOKEN` or `GH_TOKEN`
/// 4. `gh auth token --hostname {host}` command
#[derive(Debug, Clone, Default)]
pub struct TokenResolver {
    explicit: Option<String>,
}

impl TokenResolver {
    /// Create a resolver that prefers `explicit` when it is non-empty
    pub fn new(explicit: Option<String>) -> Self {
        Self {
            explicit: explicit.filter(|t| !t.trim().is_empty()),
        }
    }

    /// Get a token for the given host (None = github.com)
    pub async fn resolve(&self, host: Option<&str>) -> Result<String> {
        let host = host.unwrap_or(DEFAULT_HOST);

        if let Some(ref token) = self.explicit {
            debug!("Using explicitly provided token for host {}", host);
            return Ok(token.clone());
        }

        let env_key = host_env_key(host);
        if let Ok(token) = std::env::var(&env_key) {
            debug!("Using token from env var {} for host {}", env_key, host);
            return Ok(token);
        }

        if let Ok(token) = std::env::var("GITHUB_TOKEN").or_else(|_| std::env::var("GH_TOKEN")) {
            debug!("Using default token (GITHUB_TOKEN/GH_TOKEN) for host {}", host);
            return Ok(token);
        }

        debug!("Trying gh auth token for host {}", host);
        let output = tokio::process::Command::new("gh")
            .args(["auth", "token", "--hostname", host])
            .output()
            .await
            .context("Failed to run 'gh auth token'")?;

        if output.status.success() {
            let token = String::from_utf8(output.stdout)
                .context("Invalid UTF-8 in gh auth token output")?
                .trim()
                .to_string();
            if !token.is_empty() {
                debug!("Using token from gh CLI for host {}", host);
                return Ok(token);
            }
        }

        Err(anyhow::anyhow!(
            "No token found for host '{}'. \
             Pass --token, set {} or GITHUB_TOKEN, or run 'gh auth login --hostname {}'",
            host,
            env_key,
            host
        ))
    }
}

/// Name of the host-specific token env var
fn host_env_key(host: &str) -> String {
    format!(
        "GITHUB_TOKEN_{}",
        host.replace(['.', '-'], "_").to_uppercase()
    )
}

/// API base URI for an enterprise host, None for github.com
///
/// octocrab appends `/graphql` to the base path, and enterprise servers serve
/// GraphQL at `/api/graphql` (REST lives under `/api/v3`).
fn enterprise_base_uri(host: Option<&str>) -> Option<String> {
    match host {
        Some(h) if h != DEFAULT_HOST => Some(api_base(&format!("https://{}", h))),
        _ => None,
    }
}

fn api_base(origin: &str) -> String {
    format!("{}/api", origin)
}

/// Build an authenticated octocrab instance for the given host
pub async fn connect(host: Option<&str>, tokens: &TokenResolver) -> Result<Octocrab> {
    let effective_host = host.unwrap_or(DEFAULT_HOST);
    info!("Creating GitHub client for host: {}", effective_host);

    let token = tokens.resolve(host).await?;
    let mut builder = Octocrab::builder().personal_token(token);

    if let Some(uri) = enterprise_base_uri(host) {
        builder = builder.base_uri(&uri).context("Failed to set base URI")?;
    }

    builder.build().context("Failed to build Octocrab client")
}
