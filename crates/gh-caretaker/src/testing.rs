//! In-memory `IssueTracker` for tests
//!
//! Serves canned pull requests, issues and boards, records every write and
//! remembers the last status set per project item so follow-up reads see it.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use gh_client::{
    BoardItem, IssueTracker, Issue, ItemContent, Label, Page, ProjectAttachment, ProjectBoard,
    ProjectItem, PullRequest, Reaction, StatusField, StatusOption, TrackerError, User,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

/// A write performed against the fake
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    UpdateStatus { item_id: String, status: String },
    AddLabel { label: String, target: String },
    RemoveLabel { label: String, target: String },
    Comment { target: String, body: String },
    Reaction { target: String, reaction: Reaction },
    Assign { user: String, target: String },
    Attach { board: String, content: String },
}

#[derive(Default)]
struct FakeState {
    prs: Vec<PullRequest>,
    issues: Vec<Issue>,
    boards: Vec<ProjectBoard>,
    board_items: BTreeMap<u64, Vec<BoardItem>>,
    page_size: usize,
    labels: Vec<Label>,
    users: Vec<User>,
    statuses: HashMap<String, String>,
    writes: Vec<Call>,
    page_requests: Vec<Option<String>>,
    fail_status_for: HashSet<String>,
    fail_comments: bool,
}

impl FakeState {
    fn apply_statuses(&self, attachments: &mut [ProjectAttachment]) {
        for attachment in attachments {
            if let Some(status) = self.statuses.get(&attachment.item.id) {
                attachment.item.status = Some(status.clone());
            }
        }
    }

    fn issue_view(&self, issue: &Issue) -> Issue {
        let mut issue = issue.clone();
        self.apply_statuses(&mut issue.attachments);
        issue
    }

    fn pr_view(&self, pr: &PullRequest) -> PullRequest {
        let mut pr = pr.clone();
        self.apply_statuses(&mut pr.attachments);
        pr.closing_issues = pr.closing_issues.iter().map(|i| self.issue_view(i)).collect();
        pr
    }

    fn board_item_view(&self, item: &BoardItem) -> BoardItem {
        let mut item = item.clone();
        if let Some(status) = self.statuses.get(&item.item.id) {
            item.item.status = Some(status.clone());
        }
        item.content = item.content.map(|content| match content {
            ItemContent::Issue(issue) => ItemContent::Issue(self.issue_view(&issue)),
            ItemContent::PullRequest(pr) => ItemContent::PullRequest(self.pr_view(&pr)),
        });
        item
    }

    fn label(&self, name: &str) -> gh_client::Result<Label> {
        let matching: Vec<&Label> = self.labels.iter().filter(|l| l.name == name).collect();
        match matching.as_slice() {
            [label] => Ok((*label).clone()),
            other => Err(TrackerError::AmbiguousOrMissingLabel {
                name: name.to_string(),
                found: other.len(),
            }),
        }
    }
}

#[derive(Default)]
pub(crate) struct FakeTracker {
    state: Mutex<FakeState>,
}

impl FakeTracker {
    pub(crate) fn add_pull_request(&self, pr: PullRequest) {
        self.state.lock().unwrap().prs.push(pr);
    }

    pub(crate) fn add_issue(&self, issue: Issue) {
        self.state.lock().unwrap().issues.push(issue);
    }

    pub(crate) fn add_board(&self, board: ProjectBoard, items: Vec<BoardItem>) {
        let mut state = self.state.lock().unwrap();
        state.board_items.insert(board.number, items);
        state.boards.push(board);
    }

    pub(crate) fn set_page_size(&self, size: usize) {
        self.state.lock().unwrap().page_size = size;
    }

    pub(crate) fn define_label(&self, name: &str) {
        let mut state = self.state.lock().unwrap();
        let id = format!("LA_{}", state.labels.len());
        state.labels.push(Label {
            id,
            name: name.to_string(),
        });
    }

    pub(crate) fn add_user(&self, login: &str) {
        self.state.lock().unwrap().users.push(User {
            id: format!("U_{}", login),
            login: login.to_string(),
        });
    }

    pub(crate) fn fail_status_update_for(&self, item_id: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_status_for
            .insert(item_id.to_string());
    }

    pub(crate) fn fail_comments(&self) {
        self.state.lock().unwrap().fail_comments = true;
    }

    pub(crate) fn writes(&self) -> Vec<Call> {
        self.state.lock().unwrap().writes.clone()
    }

    pub(crate) fn page_requests(&self) -> Vec<Option<String>> {
        self.state.lock().unwrap().page_requests.clone()
    }

    pub(crate) fn issue_snapshot(&self, number: u64) -> Issue {
        let state = self.state.lock().unwrap();
        let issue = state
            .issues
            .iter()
            .find(|i| i.number == number)
            .expect("issue registered with the fake");
        state.issue_view(issue)
    }

    pub(crate) fn pr_snapshot(&self, number: u64) -> PullRequest {
        let state = self.state.lock().unwrap();
        let pr = state
            .prs
            .iter()
            .find(|p| p.number == number)
            .expect("pull request registered with the fake");
        state.pr_view(pr)
    }
}

#[async_trait]
impl IssueTracker for FakeTracker {
    async fn open_pull_requests(&self) -> gh_client::Result<Vec<PullRequest>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .prs
            .iter()
            .filter(|pr| !pr.closed)
            .map(|pr| state.pr_view(pr))
            .collect())
    }

    async fn pull_request(&self, number: u64) -> gh_client::Result<PullRequest> {
        let state = self.state.lock().unwrap();
        state
            .prs
            .iter()
            .find(|pr| pr.number == number)
            .map(|pr| state.pr_view(pr))
            .ok_or_else(|| TrackerError::NotFound(format!("pull request #{}", number)))
    }

    async fn issue(&self, number: u64) -> gh_client::Result<Issue> {
        let state = self.state.lock().unwrap();
        state
            .issues
            .iter()
            .find(|i| i.number == number)
            .map(|i| state.issue_view(i))
            .ok_or_else(|| TrackerError::NotFound(format!("issue #{}", number)))
    }

    async fn project_board(&self, number: u64) -> gh_client::Result<ProjectBoard> {
        let state = self.state.lock().unwrap();
        state
            .boards
            .iter()
            .find(|b| b.number == number)
            .cloned()
            .ok_or_else(|| TrackerError::NotFound(format!("project board #{}", number)))
    }

    async fn project_items(
        &self,
        board_number: u64,
        cursor: Option<&str>,
    ) -> gh_client::Result<Page<BoardItem>> {
        let mut state = self.state.lock().unwrap();
        state.page_requests.push(cursor.map(str::to_string));

        let items = state
            .board_items
            .get(&board_number)
            .ok_or_else(|| TrackerError::NotFound(format!("project board #{}", board_number)))?;

        let page_size = if state.page_size == 0 { 100 } else { state.page_size };
        let start: usize = cursor.and_then(|c| c.parse().ok()).unwrap_or(0);
        let end = (start + page_size).min(items.len());

        Ok(Page {
            items: items[start..end]
                .iter()
                .map(|item| state.board_item_view(item))
                .collect(),
            end_cursor: Some(end.to_string()),
            has_next_page: end < items.len(),
        })
    }

    async fn update_item_status(
        &self,
        _project_id: &str,
        item_id: &str,
        _field_id: &str,
        option_id: &str,
    ) -> gh_client::Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_status_for.contains(item_id) {
            return Err(TrackerError::GraphQl(format!("cannot update {}", item_id)));
        }

        let status = option_name(option_id);
        state.statuses.insert(item_id.to_string(), status.clone());
        state.writes.push(Call::UpdateStatus {
            item_id: item_id.to_string(),
            status,
        });
        Ok(())
    }

    async fn label(&self, name: &str) -> gh_client::Result<Label> {
        self.state.lock().unwrap().label(name)
    }

    async fn add_label(&self, label_name: &str, target_id: &str) -> gh_client::Result<()> {
        let mut state = self.state.lock().unwrap();
        let label = state.label(label_name)?;
        if let Some(pr) = state.prs.iter_mut().find(|pr| pr.id == target_id) {
            if !pr.has_label(&label.name) {
                pr.labels.push(label.name.clone());
            }
        }
        state.writes.push(Call::AddLabel {
            label: label.name,
            target: target_id.to_string(),
        });
        Ok(())
    }

    async fn remove_label(&self, label_name: &str, target_id: &str) -> gh_client::Result<()> {
        let mut state = self.state.lock().unwrap();
        let label = state.label(label_name)?;
        if let Some(pr) = state.prs.iter_mut().find(|pr| pr.id == target_id) {
            pr.labels.retain(|l| *l != label.name);
        }
        state.writes.push(Call::RemoveLabel {
            label: label.name,
            target: target_id.to_string(),
        });
        Ok(())
    }

    async fn add_comment(&self, target_id: &str, body: &str) -> gh_client::Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_comments {
            return Err(TrackerError::GraphQl("commenting is forbidden".into()));
        }
        state.writes.push(Call::Comment {
            target: target_id.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }

    async fn add_reaction(&self, target_id: &str, reaction: Reaction) -> gh_client::Result<()> {
        self.state.lock().unwrap().writes.push(Call::Reaction {
            target: target_id.to_string(),
            reaction,
        });
        Ok(())
    }

    async fn resolve_user(&self, login: &str) -> gh_client::Result<User> {
        let state = self.state.lock().unwrap();
        state
            .users
            .iter()
            .find(|u| u.login == login)
            .cloned()
            .ok_or_else(|| TrackerError::NotFound(format!("user {}", login)))
    }

    async fn assign_user(&self, user_id: &str, target_id: &str) -> gh_client::Result<()> {
        self.state.lock().unwrap().writes.push(Call::Assign {
            user: user_id.to_string(),
            target: target_id.to_string(),
        });
        Ok(())
    }

    async fn attach_to_project(&self, board_id: &str, content_id: &str) -> gh_client::Result<String> {
        self.state.lock().unwrap().writes.push(Call::Attach {
            board: board_id.to_string(),
            content: content_id.to_string(),
        });
        Ok(format!("PVTI_{}", content_id))
    }
}

// === Builders ===

/// Option IDs look like `opt:<board>:<name>` so the fake can recover the name
fn option_name(option_id: &str) -> String {
    option_id
        .splitn(3, ':')
        .nth(2)
        .unwrap_or(option_id)
        .to_string()
}

pub(crate) fn board(number: u64, options: &[&str]) -> ProjectBoard {
    ProjectBoard {
        id: format!("PVT_{}", number),
        title: format!("Board {}", number),
        number,
        status_field: Some(StatusField {
            id: format!("PVTSSF_{}", number),
            options: options
                .iter()
                .map(|name| StatusOption {
                    id: format!("opt:{}:{}", number, name),
                    name: name.to_string(),
                })
                .collect(),
        }),
    }
}

pub(crate) fn attachment(board: ProjectBoard, item_id: &str, status: Option<&str>) -> ProjectAttachment {
    ProjectAttachment {
        board,
        item: ProjectItem {
            id: item_id.to_string(),
            status: status.map(str::to_string),
            updated_at: days_ago(0),
        },
    }
}

pub(crate) fn issue(number: u64, attachments: Vec<ProjectAttachment>) -> Issue {
    Issue {
        id: format!("I_{}", number),
        number,
        title: format!("Issue {}", number),
        closed: false,
        attachments,
    }
}

pub(crate) fn pull_request(
    number: u64,
    updated_at: DateTime<Utc>,
    closing_issues: Vec<Issue>,
) -> PullRequest {
    PullRequest {
        id: format!("PR_{}", number),
        number,
        title: format!("Pull request {}", number),
        closed: false,
        updated_at,
        labels: vec![],
        closing_issues,
        attachments: vec![],
    }
}

pub(crate) fn board_item(
    item_id: &str,
    status: Option<&str>,
    updated_at: DateTime<Utc>,
    content: Option<ItemContent>,
) -> BoardItem {
    BoardItem {
        item: ProjectItem {
            id: item_id.to_string(),
            status: status.map(str::to_string),
            updated_at,
        },
        content,
    }
}

pub(crate) fn days_ago(days: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(days)
}
