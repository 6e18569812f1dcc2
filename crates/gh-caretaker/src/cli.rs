//! CLI type definitions
//!
//! Every flag can also come from an environment variable, and boolean flags
//! take an optional `true`/`false` value since workflow inputs are strings.

use clap::builder::{BoolishValueParser, TypedValueParser};
use clap::{Parser, Subcommand};
use gh_caretaker_config::{parse_duration, AppConfig};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "gh-caretaker")]
#[command(about = "Keeps project board status in sync with pull requests", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// GitHub token (falls back to GH_TOKEN or `gh auth token`)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Repository owner (user or organization)
    #[arg(long, env = "CARETAKER_OWNER", global = true)]
    pub owner: Option<String>,

    /// Repository name
    #[arg(long, env = "CARETAKER_REPO", global = true)]
    pub repo: Option<String>,

    /// GitHub Enterprise host (defaults to github.com)
    #[arg(long, env = "CARETAKER_HOST", global = true)]
    pub host: Option<String>,

    /// Config file (defaults to .gh-caretaker.toml in the current or home directory)
    #[arg(long, env = "CARETAKER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Debug output
    #[arg(short, long, env = "CARETAKER_VERBOSE", global = true)]
    pub verbose: bool,

    /// Project boards belong to an organization
    #[arg(long, env = "CARETAKER_IS_ORGANIZATION", global = true,
          num_args = 0..=1, default_missing_value = "true",
          value_parser = OptionalBoolParser)]
    pub is_organization: Option<OptionalBool>,

    /// Never post comments
    #[arg(long, env = "CARETAKER_DISABLE_COMMENTS", global = true,
          num_args = 0..=1, default_missing_value = "true",
          value_parser = OptionalBoolParser)]
    pub disable_comments: Option<OptionalBool>,

    /// Also move closed issues and pull requests
    #[arg(long, env = "CARETAKER_MOVE_CLOSED", global = true,
          num_args = 0..=1, default_missing_value = "true",
          value_parser = OptionalBoolParser)]
    pub move_closed: Option<OptionalBool>,

    /// Label marking pull requests a scan already processed [default: caretaker-processed]
    #[arg(long, env = "CARETAKER_PULL_REQUEST_PROCESSED_LABEL", global = true)]
    pub pull_request_processed_label: Option<String>,

    /// How long an item must be untouched to count as stale, e.g. 24h or 1h30m [default: 24h]
    #[arg(long, env = "CARETAKER_STALE_INTERVAL", global = true, value_parser = parse_duration)]
    pub stale_interval: Option<Duration>,

    /// Status to move items to
    #[arg(long, env = "CARETAKER_STATUS_OPTION", global = true)]
    pub status_option: Option<String>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Move the issues of stale open pull requests
    Scan,

    /// Move the issues of an updated pull request and clear its scan marker
    PullRequestUpdated {
        #[arg(long, env = "CARETAKER_PULL_REQUEST_NUMBER")]
        pull_request_number: u64,
    },

    /// Add an issue to a project board
    AssignIssue {
        #[arg(long, env = "CARETAKER_ISSUE_NUMBER")]
        issue_number: u64,

        #[arg(long, env = "CARETAKER_PROJECT_NUMBER")]
        project_number: u64,
    },

    /// Move one issue on one project board
    UpdateIssue {
        #[arg(long, env = "CARETAKER_ISSUE_NUMBER")]
        issue_number: u64,

        #[arg(long, env = "CARETAKER_PROJECT_NUMBER")]
        project_number: u64,

        /// Only move the issue while it has this status
        #[arg(long, env = "CARETAKER_FROM_STATUS_OPTION")]
        from_status_option: Option<String>,
    },

    /// Run the slash commands of a pull request comment
    Slash {
        #[arg(long, env = "CARETAKER_PULL_REQUEST_NUMBER")]
        pull_request_number: u64,

        /// Login of the user who wrote the comment
        #[arg(long, env = "CARETAKER_ACTOR")]
        actor: String,

        /// Node ID of the comment
        #[arg(long, env = "CARETAKER_COMMENT_ID")]
        comment_id: String,

        #[arg(long, env = "CARETAKER_COMMENT_BODY")]
        comment_body: String,
    },

    /// Move stale items of a project board from one status to another
    ScanProject {
        #[arg(long, env = "CARETAKER_PROJECT_NUMBER")]
        project_number: u64,

        /// Status the items must currently have
        #[arg(long, env = "CARETAKER_FROM_STATUS_OPTION")]
        from_status_option: Option<String>,
    },
}

/// A boolean input that may be given as an empty string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionalBool(pub Option<bool>);

/// `BoolishValueParser` that maps an empty value to an unset `OptionalBool`
#[derive(Debug, Clone, Copy)]
pub struct OptionalBoolParser;

impl TypedValueParser for OptionalBoolParser {
    type Value = OptionalBool;

    fn parse_ref(
        &self,
        cmd: &clap::Command,
        arg: Option<&clap::Arg>,
        value: &OsStr,
    ) -> Result<Self::Value, clap::Error> {
        if value.to_string_lossy().trim().is_empty() {
            return Ok(OptionalBool(None));
        }
        BoolishValueParser::new()
            .parse_ref(cmd, arg, value)
            .map(|v| OptionalBool(Some(v)))
    }
}

fn given(flag: Option<OptionalBool>) -> Option<bool> {
    flag.and_then(|f| f.0)
}

/// Treat empty strings (unset workflow inputs) as absent
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl Cli {
    pub fn is_organization(&self) -> Option<bool> {
        given(self.is_organization)
    }

    pub fn disable_comments(&self) -> Option<bool> {
        given(self.disable_comments)
    }

    pub fn move_closed(&self) -> Option<bool> {
        given(self.move_closed)
    }

    /// Overlay the flags that were given on top of the loaded config
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(v) = self.is_organization() {
            config.is_organization = v;
        }
        if let Some(v) = self.disable_comments() {
            config.disable_comments = v;
        }
        if let Some(v) = self.move_closed() {
            config.move_closed = v;
        }
        if let Some(label) = non_empty(&self.pull_request_processed_label) {
            config.processed_label = label.to_string();
        }
        if let Some(interval) = self.stale_interval {
            config.stale_interval = interval;
        }
    }
}
