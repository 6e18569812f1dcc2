use super::{convert_args, SlashCommand};
use crate::error::Result;
use crate::status::StatusSynchronizer;
use async_trait::async_trait;
use gh_client::IssueTracker;
use log::info;
use std::sync::Arc;

pub const COMMAND: &str = "/review";

const STATUS_KEY: &str = "status";

/// `/review [status=<name>]`: marks the linked issues as ready for review
pub struct ReviewCommand {
    tracker: Arc<dyn IssueTracker>,
    synchronizer: StatusSynchronizer,
    default_status: String,
}

impl ReviewCommand {
    pub fn new(
        tracker: Arc<dyn IssueTracker>,
        synchronizer: StatusSynchronizer,
        default_status: impl Into<String>,
    ) -> Self {
        Self {
            tracker,
            synchronizer,
            default_status: default_status.into(),
        }
    }
}

#[async_trait]
impl SlashCommand for ReviewCommand {
    async fn execute(&self, pull_number: u64, _actor: &str, args: &[&str]) -> Result<()> {
        let args = convert_args(args)?;
        let status = args
            .get(STATUS_KEY)
            .map(String::as_str)
            .unwrap_or(self.default_status.as_str());

        let pr = self.tracker.pull_request(pull_number).await?;
        for issue in &pr.closing_issues {
            self.synchronizer.sync_status(issue, status, None).await?;
        }

        info!("PR #{} is up for review ('{}')", pr.number, status);
        Ok(())
    }

    fn help(&self) -> String {
        format!(
            "- `/review` sets all linked issues to \"{}\", \
             to override the status use: status=\"Custom In Review\" as command argument",
            self.default_status
        )
    }
}
