//! Keeps issue tracker status in sync with pull requests
//!
//! Components:
//! - `StatusSynchronizer` moves an issue or pull request to a named status on
//!   every project board it is on.
//! - `PullRequestScanner` and `ProjectScanner` find stale work and move it.
//! - `Dispatcher` runs slash commands typed into pull request comments.
//! - `actions` handles single pull requests and issues.
//!
//! Everything talks to GitHub through `gh_client::IssueTracker`.

pub mod actions;
pub mod cli;
pub mod error;
pub mod scanner;
pub mod slash;
pub mod status;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use scanner::{is_stale, ProjectScanner, PullRequestScanner, ScanReport, Skip};
pub use slash::{convert_args, parse_commands, Dispatcher, SlashCommand};
pub use status::StatusSynchronizer;
