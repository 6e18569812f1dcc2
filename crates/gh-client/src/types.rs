//! GitHub API data transfer objects
//!
//! These types represent the issue tracker entities the caretaker reads and
//! mutates. They are intentionally separate from the raw GraphQL response
//! shapes (see `graphql`) to keep callers free of wire details.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One named choice of a board's "Status" single-select field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusOption {
    /// Option node ID (board specific)
    pub id: String,

    /// Human readable name (e.g., "In Review")
    pub name: String,
}

/// The "Status" single-select field of a project board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusField {
    /// Field node ID
    pub id: String,

    /// Options in board order
    pub options: Vec<StatusOption>,
}

impl StatusField {
    /// Find the option whose name equals `name` exactly
    pub fn option_named(&self, name: &str) -> Option<&StatusOption> {
        self.options.iter().find(|o| o.name == name)
    }
}

/// A project board (GitHub Projects V2)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectBoard {
    /// Project node ID
    pub id: String,

    /// Display title
    pub title: String,

    /// Owner-scoped project number, the one used on the CLI
    pub number: u64,

    /// Status field, absent when the board has no single-select "Status" field
    pub status_field: Option<StatusField>,
}

impl ProjectBoard {
    /// Look up a status option by name
    pub fn status_option(&self, name: &str) -> Option<&StatusOption> {
        self.status_field.as_ref()?.option_named(name)
    }
}

/// The per-board card that links an issue or pull request to a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectItem {
    /// Item node ID, distinct from the issue/PR ID
    pub id: String,

    /// Currently selected status name, if any
    pub status: Option<String>,

    /// When the card was last updated
    pub updated_at: DateTime<Utc>,
}

/// Binds an issue or pull request to one board through its card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectAttachment {
    pub board: ProjectBoard,
    pub item: ProjectItem,
}

/// An issue from the GitHub API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Issue node ID
    pub id: String,

    /// Issue number (e.g., 42)
    pub number: u64,

    /// Issue title
    pub title: String,

    /// Whether the issue is closed
    pub closed: bool,

    /// Boards this issue is on, in API order
    pub attachments: Vec<ProjectAttachment>,
}

/// A pull request from the GitHub API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Pull request node ID
    pub id: String,

    /// PR number (e.g., 123)
    pub number: u64,

    /// PR title
    pub title: String,

    /// Whether the PR is closed or merged
    pub closed: bool,

    /// When the PR was last updated (any activity)
    pub updated_at: DateTime<Utc>,

    /// Names of the labels currently on the PR
    pub labels: Vec<String>,

    /// Issues this PR closes when merged
    pub closing_issues: Vec<Issue>,

    /// Boards this PR itself is on
    pub attachments: Vec<ProjectAttachment>,
}

impl PullRequest {
    /// Whether the PR carries a label with exactly this name
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l == name)
    }
}

/// Content behind a board card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemContent {
    Issue(Issue),
    PullRequest(PullRequest),
}

impl ItemContent {
    /// Borrow the content as a status-trackable entity
    pub fn as_trackable(&self) -> &dyn Trackable {
        match self {
            ItemContent::Issue(issue) => issue,
            ItemContent::PullRequest(pr) => pr,
        }
    }
}

/// A card as enumerated from a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardItem {
    pub item: ProjectItem,

    /// None for draft issues and other content the caretaker cannot move
    pub content: Option<ItemContent>,
}

/// One page of a cursor-paginated connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

/// A repository label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    pub name: String,
}

/// A GitHub user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub login: String,
}

/// Reaction content, serialized the way the GraphQL `ReactionContent` enum expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reaction {
    ThumbsUp,
    ThumbsDown,
    Laugh,
    Hooray,
    Confused,
    Heart,
    Rocket,
    Eyes,
}

/// Capability shared by issues and pull requests so one status routine
/// serves both
pub trait Trackable: Send + Sync {
    fn id(&self) -> &str;
    fn title(&self) -> &str;
    fn number(&self) -> u64;
    fn attachments(&self) -> &[ProjectAttachment];
    fn is_closed(&self) -> bool;
}

impl Trackable for Issue {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn number(&self) -> u64 {
        self.number
    }

    fn attachments(&self) -> &[ProjectAttachment] {
        &self.attachments
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Trackable for PullRequest {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn number(&self) -> u64 {
        self.number
    }

    fn attachments(&self) -> &[ProjectAttachment] {
        &self.attachments
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
