//! GraphQL documents and raw response shapes
//!
//! Documents are immutable `&'static str` values assembled at compile time from
//! shared fragments. Variables are built per call by the client, so no request
//! state is shared between invocations.
//!
//! Raw types mirror the JSON the API returns and are converted into the
//! public DTOs in `types`.

use crate::error::{Result, TrackerError};
use crate::types::{
    BoardItem, Issue, ItemContent, Page, ProjectAttachment, ProjectBoard, ProjectItem,
    PullRequest, StatusField, StatusOption,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

// === Fragments ===

macro_rules! item_fields {
    () => {
        r#"
fragment ItemFields on ProjectV2Item {
  id
  updatedAt
  fieldValueByName(name: "Status") {
    ... on ProjectV2ItemFieldSingleSelectValue { name }
  }
  project { ...BoardFields }
}
"#
    };
}

macro_rules! board_fields {
    () => {
        r#"
fragment BoardFields on ProjectV2 {
  id
  title
  number
  field(name: "Status") {
    ... on ProjectV2SingleSelectField { id options { id name } }
  }
}
"#
    };
}

macro_rules! issue_fields {
    () => {
        r#"
fragment IssueFields on Issue {
  id
  number
  title
  closed
  projectItems(first: 20) { nodes { ...ItemFields } }
}
"#
    };
}

macro_rules! pull_request_fields {
    () => {
        r#"
fragment PullRequestFields on PullRequest {
  id
  number
  title
  closed
  updatedAt
  labels(first: 50) { nodes { name } }
  closingIssuesReferences(first: 10) { nodes { ...IssueFields } }
  projectItems(first: 20) { nodes { ...ItemFields } }
}
"#
    };
}

macro_rules! board_query {
    ($owner:literal) => {
        concat!(
            "query($login: String!, $number: Int!) {\n  owner: ",
            $owner,
            "(login: $login) {\n    projectV2(number: $number) { ...BoardFields }\n  }\n}\n",
            board_fields!()
        )
    };
}

macro_rules! board_items_query {
    ($owner:literal) => {
        concat!(
            "query($login: String!, $number: Int!, $cursor: String) {\n  owner: ",
            $owner,
            r#"(login: $login) {
    projectV2(number: $number) {
      items(first: 100, after: $cursor) {
        pageInfo { endCursor hasNextPage }
        nodes {
          id
          updatedAt
          fieldValueByName(name: "Status") {
            ... on ProjectV2ItemFieldSingleSelectValue { name }
          }
          content {
            __typename
            ... on Issue { ...IssueFields }
            ... on PullRequest { ...PullRequestFields }
          }
        }
      }
    }
  }
}
"#,
            pull_request_fields!(),
            issue_fields!(),
            item_fields!(),
            board_fields!()
        )
    };
}

// === Queries ===

pub(crate) const OPEN_PULL_REQUESTS: &str = concat!(
    r#"query($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) {
    pullRequests(first: 100, states: OPEN) { nodes { ...PullRequestFields } }
  }
}
"#,
    pull_request_fields!(),
    issue_fields!(),
    item_fields!(),
    board_fields!()
);

pub(crate) const PULL_REQUEST: &str = concat!(
    r#"query($owner: String!, $name: String!, $number: Int!) {
  repository(owner: $owner, name: $name) {
    pullRequest(number: $number) { ...PullRequestFields }
  }
}
"#,
    pull_request_fields!(),
    issue_fields!(),
    item_fields!(),
    board_fields!()
);

pub(crate) const ISSUE: &str = concat!(
    r#"query($owner: String!, $name: String!, $number: Int!) {
  repository(owner: $owner, name: $name) {
    issue(number: $number) { ...IssueFields }
  }
}
"#,
    issue_fields!(),
    item_fields!(),
    board_fields!()
);

pub(crate) const ORGANIZATION_BOARD: &str = board_query!("organization");
pub(crate) const USER_BOARD: &str = board_query!("user");
pub(crate) const ORGANIZATION_BOARD_ITEMS: &str = board_items_query!("organization");
pub(crate) const USER_BOARD_ITEMS: &str = board_items_query!("user");

pub(crate) const LABELS: &str = r#"query($owner: String!, $name: String!, $query: String!) {
  repository(owner: $owner, name: $name) {
    labels(first: 10, query: $query) { nodes { id name } }
  }
}
"#;

pub(crate) const USER: &str = r#"query($login: String!) {
  user(login: $login) { id login }
}
"#;

// === Mutations ===

pub(crate) const UPDATE_ITEM_FIELD: &str = r#"mutation($input: UpdateProjectV2ItemFieldValueInput!) {
  updateProjectV2ItemFieldValue(input: $input) { projectV2Item { id } }
}
"#;

pub(crate) const ADD_LABELS: &str = r#"mutation($input: AddLabelsToLabelableInput!) {
  addLabelsToLabelable(input: $input) { clientMutationId }
}
"#;

pub(crate) const REMOVE_LABELS: &str = r#"mutation($input: RemoveLabelsFromLabelableInput!) {
  removeLabelsFromLabelable(input: $input) { clientMutationId }
}
"#;

pub(crate) const ADD_COMMENT: &str = r#"mutation($input: AddCommentInput!) {
  addComment(input: $input) { commentEdge { node { id } } }
}
"#;

pub(crate) const ADD_REACTION: &str = r#"mutation($input: AddReactionInput!) {
  addReaction(input: $input) { reaction { content } }
}
"#;

pub(crate) const ADD_ASSIGNEES: &str = r#"mutation($input: AddAssigneesToAssignableInput!) {
  addAssigneesToAssignable(input: $input) { clientMutationId }
}
"#;

pub(crate) const ADD_PROJECT_ITEM: &str = r#"mutation($input: AddProjectV2ItemByIdInput!) {
  addProjectV2ItemById(input: $input) { item { id } }
}
"#;

// === Envelope ===

/// Top-level GraphQL response body
#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlError {
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
}

impl<T> GraphQlResponse<T> {
    /// Unwrap the data, turning reported errors into `TrackerError`s
    ///
    /// A response whose errors are all of type `NOT_FOUND` maps to
    /// `TrackerError::NotFound`; any other error list is a GraphQL failure.
    pub(crate) fn into_data(self) -> Result<T> {
        if !self.errors.is_empty() {
            let message = self
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            let all_not_found = self
                .errors
                .iter()
                .all(|e| e.kind.as_deref() == Some("NOT_FOUND"));
            return Err(if all_not_found {
                TrackerError::NotFound(message)
            } else {
                TrackerError::GraphQl(message)
            });
        }

        self.data
            .ok_or_else(|| TrackerError::Decode("response carried neither data nor errors".into()))
    }
}

// === Raw shapes ===

/// A connection's `nodes` list; GitHub allows null entries
#[derive(Debug, Deserialize)]
#[serde(bound = "T: Deserialize<'de>")]
pub(crate) struct Nodes<T> {
    #[serde(default)]
    nodes: Vec<Option<T>>,
}

impl<T> Nodes<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        self.nodes.into_iter().flatten().collect()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawFieldValue {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawStatusField {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    options: Vec<StatusOption>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawBoard {
    id: String,
    title: String,
    number: u64,
    #[serde(default)]
    field: Option<RawStatusField>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawItem {
    id: String,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    field_value_by_name: Option<RawFieldValue>,
    project: RawBoard,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawIssue {
    id: String,
    number: u64,
    title: String,
    closed: bool,
    project_items: Nodes<RawItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawLabelName {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawPullRequest {
    id: String,
    number: u64,
    title: String,
    closed: bool,
    updated_at: DateTime<Utc>,
    labels: Nodes<RawLabelName>,
    closing_issues_references: Nodes<RawIssue>,
    project_items: Nodes<RawItem>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
pub(crate) enum RawContent {
    Issue(RawIssue),
    PullRequest(RawPullRequest),
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawBoardItem {
    id: String,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    field_value_by_name: Option<RawFieldValue>,
    #[serde(default)]
    content: Option<RawContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawPageInfo {
    end_cursor: Option<String>,
    has_next_page: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawItemConnection {
    page_info: RawPageInfo,
    #[serde(default)]
    nodes: Vec<Option<RawBoardItem>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawBoardWithItems {
    pub(crate) items: RawItemConnection,
}

// === Data roots ===

#[derive(Debug, Deserialize)]
pub(crate) struct RepositoryData<T> {
    pub(crate) repository: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PullRequestsRoot {
    pub(crate) pull_requests: Nodes<RawPullRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PullRequestRoot {
    pub(crate) pull_request: Option<RawPullRequest>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IssueRoot {
    pub(crate) issue: Option<RawIssue>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LabelsRoot {
    pub(crate) labels: Nodes<crate::types::Label>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwnerData<T> {
    pub(crate) owner: Option<OwnerRoot<T>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwnerRoot<T> {
    #[serde(rename = "projectV2")]
    pub(crate) project: Option<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserData {
    pub(crate) user: Option<crate::types::User>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IdOnly {
    pub(crate) id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddedItem {
    pub(crate) item: Option<IdOnly>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddProjectItemData {
    #[serde(rename = "addProjectV2ItemById")]
    pub(crate) added: Option<AddedItem>,
}

// === Conversions ===

impl From<RawBoard> for ProjectBoard {
    fn from(raw: RawBoard) -> Self {
        let status_field = raw.field.and_then(|f| {
            f.id.map(|id| StatusField {
                id,
                options: f.options,
            })
        });

        ProjectBoard {
            id: raw.id,
            title: raw.title,
            number: raw.number,
            status_field,
        }
    }
}

fn status_name(value: Option<RawFieldValue>) -> Option<String> {
    value.and_then(|v| v.name)
}

impl From<RawItem> for ProjectAttachment {
    fn from(raw: RawItem) -> Self {
        ProjectAttachment {
            board: raw.project.into(),
            item: ProjectItem {
                id: raw.id,
                status: status_name(raw.field_value_by_name),
                updated_at: raw.updated_at,
            },
        }
    }
}

impl From<RawIssue> for Issue {
    fn from(raw: RawIssue) -> Self {
        Issue {
            id: raw.id,
            number: raw.number,
            title: raw.title,
            closed: raw.closed,
            attachments: raw.project_items.into_vec().into_iter().map(Into::into).collect(),
        }
    }
}

impl From<RawPullRequest> for PullRequest {
    fn from(raw: RawPullRequest) -> Self {
        PullRequest {
            id: raw.id,
            number: raw.number,
            title: raw.title,
            closed: raw.closed,
            updated_at: raw.updated_at,
            labels: raw.labels.into_vec().into_iter().map(|l| l.name).collect(),
            closing_issues: raw
                .closing_issues_references
                .into_vec()
                .into_iter()
                .map(Into::into)
                .collect(),
            attachments: raw.project_items.into_vec().into_iter().map(Into::into).collect(),
        }
    }
}

impl From<RawBoardItem> for BoardItem {
    fn from(raw: RawBoardItem) -> Self {
        let content = match raw.content {
            Some(RawContent::Issue(issue)) => Some(ItemContent::Issue(issue.into())),
            Some(RawContent::PullRequest(pr)) => Some(ItemContent::PullRequest(pr.into())),
            Some(RawContent::Unsupported) | None => None,
        };

        BoardItem {
            item: ProjectItem {
                id: raw.id,
                status: status_name(raw.field_value_by_name),
                updated_at: raw.updated_at,
            },
            content,
        }
    }
}

impl From<RawItemConnection> for Page<BoardItem> {
    fn from(raw: RawItemConnection) -> Self {
        Page {
            items: raw.nodes.into_iter().flatten().map(Into::into).collect(),
            end_cursor: raw.page_info.end_cursor,
            has_next_page: raw.page_info.has_next_page,
        }
    }
}
