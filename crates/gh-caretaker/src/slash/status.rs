use super::{convert_args, SlashCommand};
use crate::error::{Error, Result};
use crate::status::StatusSynchronizer;
use async_trait::async_trait;
use gh_client::IssueTracker;
use std::sync::Arc;

pub const COMMAND: &str = "/status";

const STATUS_KEY: &str = "status";

/// `/status status=<name>`: moves every issue the PR closes to `<name>`
pub struct StatusCommand {
    tracker: Arc<dyn IssueTracker>,
    synchronizer: StatusSynchronizer,
}

impl StatusCommand {
    pub fn new(tracker: Arc<dyn IssueTracker>, synchronizer: StatusSynchronizer) -> Self {
        Self {
            tracker,
            synchronizer,
        }
    }
}

#[async_trait]
impl SlashCommand for StatusCommand {
    async fn execute(&self, pull_number: u64, _actor: &str, args: &[&str]) -> Result<()> {
        let args = convert_args(args)?;
        let status = args
            .get(STATUS_KEY)
            .ok_or_else(|| Error::MissingArgument(STATUS_KEY.to_string()))?;

        let pr = self.tracker.pull_request(pull_number).await?;
        for issue in &pr.closing_issues {
            self.synchronizer.sync_status(issue, status, None).await?;
        }

        Ok(())
    }

    fn help(&self) -> String {
        "- `/status status=\"<status>\"` moves all linked issues to the given status".to_string()
    }
}
