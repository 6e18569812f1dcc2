//! GitHub issue tracker gateway
//!
//! This crate provides a trait-based gateway over the GitHub GraphQL API for
//! the data the caretaker works with: pull requests, issues, Projects V2
//! boards and their "Status" field, labels, comments, reactions and
//! assignees.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │              IssueTracker trait                  │
//! │  - open_pull_requests() / pull_request()         │
//! │  - project_board() / project_items()             │
//! │  - update_item_status() / add_label() / ...      │
//! └─────────────────────────────────────────────────┘
//!                        │
//!                        ▼
//!              ┌─────────────────┐
//!              │ OctocrabClient  │
//!              │ (GraphQL)       │
//!              └─────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use gh_client::{BoardOwner, IssueTracker, OctocrabClient, TokenResolver};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let octocrab = gh_client::connect(None, &TokenResolver::default()).await?;
//! let client = OctocrabClient::new(
//!     Arc::new(octocrab),
//!     "octo-org",
//!     "octo-repo",
//!     BoardOwner::Organization,
//! );
//!
//! let prs = client.open_pull_requests().await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
mod graphql;
pub mod octocrab_client;
pub mod token;
pub mod types;

/// Default GitHub host (public GitHub)
pub const DEFAULT_HOST: &str = "github.com";

pub use client::{BoardOwner, IssueTracker};
pub use error::{Result, TrackerError};
pub use octocrab_client::OctocrabClient;
pub use token::{connect, TokenResolver};
pub use types::{
    BoardItem, Issue, ItemContent, Label, Page, ProjectAttachment, ProjectBoard, ProjectItem,
    PullRequest, Reaction, StatusField, StatusOption, Trackable, User,
};

// Re-export octocrab so consumers don't need to depend on it directly
pub use octocrab;
