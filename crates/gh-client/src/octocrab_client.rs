//! Octocrab-based issue tracker
//!
//! Implements `IssueTracker` on top of the GitHub GraphQL endpoint using the
//! octocrab library for transport and authentication.

use crate::client::{BoardOwner, IssueTracker};
use crate::error::{Result, TrackerError};
use crate::graphql::{
    self, AddProjectItemData, GraphQlResponse, IssueRoot, LabelsRoot, OwnerData, PullRequestRoot,
    PullRequestsRoot, RawBoard, RawBoardWithItems, RepositoryData, UserData,
};
use crate::types::{BoardItem, Issue, Label, Page, ProjectBoard, PullRequest, Reaction, User};
use async_trait::async_trait;
use log::debug;
use octocrab::Octocrab;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;

/// GitHub GraphQL client bound to one repository
#[derive(Debug, Clone)]
pub struct OctocrabClient {
    octocrab: Arc<Octocrab>,
    owner: String,
    repo: String,
    board_owner: BoardOwner,
}

impl OctocrabClient {
    /// Create a new client for `owner/repo`
    ///
    /// Project boards are looked up under `owner` as an organization or as a
    /// user depending on `board_owner`.
    pub fn new(
        octocrab: Arc<Octocrab>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        board_owner: BoardOwner,
    ) -> Self {
        Self {
            octocrab,
            owner: owner.into(),
            repo: repo.into(),
            board_owner,
        }
    }

    /// Get a reference to the underlying octocrab instance
    pub fn octocrab(&self) -> &Octocrab {
        &self.octocrab
    }

    /// Run one GraphQL document and unwrap its `data`
    async fn run<T: DeserializeOwned>(
        &self,
        document: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        let payload = json!({ "query": document, "variables": variables });
        let response: GraphQlResponse<T> = self.octocrab.graphql(&payload).await?;
        response.into_data()
    }

    /// Run a mutation whose payload is not needed
    async fn mutate(&self, document: &str, input: serde_json::Value) -> Result<()> {
        self.run::<serde_json::Value>(document, json!({ "input": input }))
            .await
            .map(|_| ())
    }

    fn repository_missing(&self) -> TrackerError {
        TrackerError::NotFound(format!("repository {}/{}", self.owner, self.repo))
    }

    fn owner_missing(&self) -> TrackerError {
        let kind = match self.board_owner {
            BoardOwner::Organization => "organization",
            BoardOwner::User => "user",
        };
        TrackerError::NotFound(format!("{} {}", kind, self.owner))
    }

    fn repo_variables(&self) -> serde_json::Value {
        json!({ "owner": self.owner, "name": self.repo })
    }
}

#[async_trait]
impl IssueTracker for OctocrabClient {
    async fn open_pull_requests(&self) -> Result<Vec<PullRequest>> {
        debug!("Fetching open PRs for {}/{}", self.owner, self.repo);

        let data: RepositoryData<PullRequestsRoot> = self
            .run(graphql::OPEN_PULL_REQUESTS, self.repo_variables())
            .await?;
        let root = data.repository.ok_or_else(|| self.repository_missing())?;

        let prs: Vec<PullRequest> = root
            .pull_requests
            .into_vec()
            .into_iter()
            .map(Into::into)
            .collect();

        debug!("Fetched {} open PRs for {}/{}", prs.len(), self.owner, self.repo);
        Ok(prs)
    }

    async fn pull_request(&self, number: u64) -> Result<PullRequest> {
        debug!("Fetching PR #{} of {}/{}", number, self.owner, self.repo);

        let mut variables = self.repo_variables();
        variables["number"] = json!(number);

        let data: RepositoryData<PullRequestRoot> =
            self.run(graphql::PULL_REQUEST, variables).await?;
        data.repository
            .ok_or_else(|| self.repository_missing())?
            .pull_request
            .map(Into::into)
            .ok_or_else(|| TrackerError::NotFound(format!("pull request #{}", number)))
    }

    async fn issue(&self, number: u64) -> Result<Issue> {
        debug!("Fetching issue #{} of {}/{}", number, self.owner, self.repo);

        let mut variables = self.repo_variables();
        variables["number"] = json!(number);

        let data: RepositoryData<IssueRoot> = self.run(graphql::ISSUE, variables).await?;
        data.repository
            .ok_or_else(|| self.repository_missing())?
            .issue
            .map(Into::into)
            .ok_or_else(|| TrackerError::NotFound(format!("issue #{}", number)))
    }

    async fn project_board(&self, number: u64) -> Result<ProjectBoard> {
        debug!("Fetching project board #{} of {}", number, self.owner);

        let document = match self.board_owner {
            BoardOwner::Organization => graphql::ORGANIZATION_BOARD,
            BoardOwner::User => graphql::USER_BOARD,
        };
        let data: OwnerData<RawBoard> = self
            .run(document, json!({ "login": self.owner, "number": number }))
            .await?;

        data.owner
            .ok_or_else(|| self.owner_missing())?
            .project
            .map(Into::into)
            .ok_or_else(|| TrackerError::NotFound(format!("project board #{}", number)))
    }

    async fn project_items(
        &self,
        board_number: u64,
        cursor: Option<&str>,
    ) -> Result<Page<BoardItem>> {
        debug!(
            "Fetching items of project board #{} (cursor: {:?})",
            board_number, cursor
        );

        let document = match self.board_owner {
            BoardOwner::Organization => graphql::ORGANIZATION_BOARD_ITEMS,
            BoardOwner::User => graphql::USER_BOARD_ITEMS,
        };
        let data: OwnerData<RawBoardWithItems> = self
            .run(
                document,
                json!({ "login": self.owner, "number": board_number, "cursor": cursor }),
            )
            .await?;

        let board = data
            .owner
            .ok_or_else(|| self.owner_missing())?
            .project
            .ok_or_else(|| TrackerError::NotFound(format!("project board #{}", board_number)))?;

        let page: Page<BoardItem> = board.items.into();
        debug!(
            "Fetched {} items of project board #{} (more: {})",
            page.items.len(),
            board_number,
            page.has_next_page
        );
        Ok(page)
    }

    async fn update_item_status(
        &self,
        project_id: &str,
        item_id: &str,
        field_id: &str,
        option_id: &str,
    ) -> Result<()> {
        debug!(
            "Setting status option {} on item {} of project {}",
            option_id, item_id, project_id
        );

        self.mutate(
            graphql::UPDATE_ITEM_FIELD,
            json!({
                "projectId": project_id,
                "itemId": item_id,
                "fieldId": field_id,
                "value": { "singleSelectOptionId": option_id },
            }),
        )
        .await
    }

    async fn label(&self, name: &str) -> Result<Label> {
        debug!("Looking up label '{}' in {}/{}", name, self.owner, self.repo);

        let mut variables = self.repo_variables();
        variables["query"] = json!(name);

        let data: RepositoryData<LabelsRoot> = self.run(graphql::LABELS, variables).await?;
        let candidates = data
            .repository
            .ok_or_else(|| self.repository_missing())?
            .labels
            .into_vec();

        single_label(name, candidates)
    }

    async fn add_label(&self, label_name: &str, target_id: &str) -> Result<()> {
        let label = self.label(label_name).await?;
        debug!("Adding label '{}' to {}", label.name, target_id);

        self.mutate(
            graphql::ADD_LABELS,
            json!({ "labelableId": target_id, "labelIds": [label.id] }),
        )
        .await
    }

    async fn remove_label(&self, label_name: &str, target_id: &str) -> Result<()> {
        let label = self.label(label_name).await?;
        debug!("Removing label '{}' from {}", label.name, target_id);

        self.mutate(
            graphql::REMOVE_LABELS,
            json!({ "labelableId": target_id, "labelIds": [label.id] }),
        )
        .await
    }

    async fn add_comment(&self, target_id: &str, body: &str) -> Result<()> {
        debug!("Commenting on {}", target_id);

        self.mutate(
            graphql::ADD_COMMENT,
            json!({ "subjectId": target_id, "body": body }),
        )
        .await
    }

    async fn add_reaction(&self, target_id: &str, reaction: Reaction) -> Result<()> {
        debug!("Reacting {:?} on {}", reaction, target_id);

        self.mutate(
            graphql::ADD_REACTION,
            json!({ "subjectId": target_id, "content": reaction }),
        )
        .await
    }

    async fn resolve_user(&self, login: &str) -> Result<User> {
        debug!("Resolving user {}", login);

        let data: UserData = self.run(graphql::USER, json!({ "login": login })).await?;
        data.user
            .ok_or_else(|| TrackerError::NotFound(format!("user {}", login)))
    }

    async fn assign_user(&self, user_id: &str, target_id: &str) -> Result<()> {
        debug!("Assigning {} to {}", user_id, target_id);

        self.mutate(
            graphql::ADD_ASSIGNEES,
            json!({ "assignableId": target_id, "assigneeIds": [user_id] }),
        )
        .await
    }

    async fn attach_to_project(&self, board_id: &str, content_id: &str) -> Result<String> {
        debug!("Adding {} to project {}", content_id, board_id);

        let data: AddProjectItemData = self
            .run(
                graphql::ADD_PROJECT_ITEM,
                json!({ "input": { "projectId": board_id, "contentId": content_id } }),
            )
            .await?;

        data.added
            .and_then(|added| added.item)
            .map(|item| item.id)
            .ok_or_else(|| TrackerError::Decode("addProjectV2ItemById returned no item".into()))
    }
}

/// Pick the label whose name equals `name` exactly
///
/// The label search is fuzzy, so candidates are filtered down to exact name
/// matches; anything other than one match is an error.
fn single_label(name: &str, candidates: Vec<Label>) -> Result<Label> {
    let mut matching: Vec<Label> = candidates.into_iter().filter(|l| l.name == name).collect();

    if matching.len() == 1 {
        Ok(matching.remove(0))
    } else {
        Err(TrackerError::AmbiguousOrMissingLabel {
            name: name.to_string(),
            found: matching.len(),
        })
    }
}
