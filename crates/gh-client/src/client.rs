//! Issue tracker trait and board ownership definitions
//!
//! This module defines the core `IssueTracker` trait that all client
//! implementations must satisfy, as well as the `BoardOwner` enum that selects
//! where project boards are looked up.

use crate::error::Result;
use crate::types::{
    BoardItem, Issue, Label, Page, ProjectBoard, PullRequest, Reaction, User,
};
use async_trait::async_trait;

/// Who owns the project boards of the repository
///
/// GitHub scopes Projects V2 numbers to either an organization or a user,
/// and the GraphQL entry point differs between the two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BoardOwner {
    /// Boards live under `organization(login:)`
    Organization,

    /// Boards live under `user(login:)`
    #[default]
    User,
}

impl BoardOwner {
    pub fn from_is_organization(is_organization: bool) -> Self {
        if is_organization {
            BoardOwner::Organization
        } else {
            BoardOwner::User
        }
    }
}

/// Issue tracker gateway
///
/// A pure query/mutation façade over the GitHub GraphQL API. Every operation
/// takes identities or numbers and returns typed results. Nothing here
/// retries; a failure is reported to the caller as is.
///
/// Label add/remove and status updates are safe to call repeatedly, since
/// no local state guards against duplicate invocations across runs.
///
/// # Example
///
/// ```rust,ignore
/// use gh_client::{IssueTracker, PullRequest};
///
/// async fn stale(client: &dyn IssueTracker) -> gh_client::Result<Vec<PullRequest>> {
///     client.open_pull_requests().await
/// }
/// ```
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Fetch open pull requests of the repository
    ///
    /// Returns a single page capped at 100 entries.
    async fn open_pull_requests(&self) -> Result<Vec<PullRequest>>;

    /// Fetch a single pull request by number
    ///
    /// # Errors
    ///
    /// `TrackerError::NotFound` when the repository has no such pull request.
    async fn pull_request(&self, number: u64) -> Result<PullRequest>;

    /// Fetch a single issue by number
    async fn issue(&self, number: u64) -> Result<Issue>;

    /// Fetch a project board of the configured owner by number
    async fn project_board(&self, number: u64) -> Result<ProjectBoard>;

    /// Fetch one page of items of a project board
    ///
    /// # Arguments
    ///
    /// * `board_number` - Owner-scoped project number
    /// * `cursor` - `end_cursor` of the previous page, None for the first page
    async fn project_items(
        &self,
        board_number: u64,
        cursor: Option<&str>,
    ) -> Result<Page<BoardItem>>;

    /// Set the single-select field of a project item to the given option
    ///
    /// # Arguments
    ///
    /// * `project_id` - Project node ID
    /// * `item_id` - Project item (card) node ID
    /// * `field_id` - Status field node ID
    /// * `option_id` - Status option node ID
    async fn update_item_status(
        &self,
        project_id: &str,
        item_id: &str,
        field_id: &str,
        option_id: &str,
    ) -> Result<()>;

    /// Look up a repository label by exact name
    ///
    /// # Errors
    ///
    /// `TrackerError::AmbiguousOrMissingLabel` unless exactly one label matches.
    async fn label(&self, name: &str) -> Result<Label>;

    /// Add a label (looked up by name) to a labelable node
    async fn add_label(&self, label_name: &str, target_id: &str) -> Result<()>;

    /// Remove a label (looked up by name) from a labelable node
    async fn remove_label(&self, label_name: &str, target_id: &str) -> Result<()>;

    /// Post a comment on an issue or pull request
    async fn add_comment(&self, target_id: &str, body: &str) -> Result<()>;

    /// React to a comment or other reactable node
    async fn add_reaction(&self, target_id: &str, reaction: Reaction) -> Result<()>;

    /// Resolve a user login to its node ID
    async fn resolve_user(&self, login: &str) -> Result<User>;

    /// Add a user as assignee of an issue or pull request
    async fn assign_user(&self, user_id: &str, target_id: &str) -> Result<()>;

    /// Add an issue or pull request to a project board
    ///
    /// Returns the ID of the created (or already existing) project item.
    async fn attach_to_project(&self, board_id: &str, content_id: &str) -> Result<String>;
}
