use super::SlashCommand;
use crate::error::Result;
use async_trait::async_trait;
use gh_client::IssueTracker;
use log::info;
use std::sync::Arc;

pub const COMMAND: &str = "/assign";

/// `/assign`: assigns the commenting user to the PR and every issue it closes
pub struct AssignCommand {
    tracker: Arc<dyn IssueTracker>,
}

impl AssignCommand {
    pub fn new(tracker: Arc<dyn IssueTracker>) -> Self {
        Self { tracker }
    }
}

#[async_trait]
impl SlashCommand for AssignCommand {
    async fn execute(&self, pull_number: u64, actor: &str, _args: &[&str]) -> Result<()> {
        let pr = self.tracker.pull_request(pull_number).await?;
        let user = self.tracker.resolve_user(actor).await?;

        self.tracker.assign_user(&user.id, &pr.id).await?;
        for issue in &pr.closing_issues {
            self.tracker.assign_user(&user.id, &issue.id).await?;
        }

        info!(
            "Assigned {} to PR #{} and {} issue(s)",
            user.login,
            pr.number,
            pr.closing_issues.len()
        );
        Ok(())
    }

    fn help(&self) -> String {
        "- `/assign` assigns the pull request and all linked issues to you".to_string()
    }
}
