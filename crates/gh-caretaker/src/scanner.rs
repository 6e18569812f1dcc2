//! Staleness scanners
//!
//! Two modes share one guard chain:
//! - `PullRequestScanner` walks the open pull requests of the repository and
//!   moves the issues they close once a pull request went quiet.
//! - `ProjectScanner` walks every item of one project board and moves items
//!   stuck in a given status for too long.
//!
//! Guards short-circuit in order: scan marker label, current status, last
//! update time, linked issues. An item that fails a guard is counted as a
//! `Skip` in the `ScanReport`, never as an error.

use crate::status::StatusSynchronizer;
use chrono::{DateTime, Duration, Utc};
use gh_client::{IssueTracker, ItemContent, PullRequest};
use log::{debug, info, log, warn, Level};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Why an item was left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Skip {
    /// The pull request already carries the scan marker label
    AlreadyProcessed,

    /// The item's current status is not the one being scanned for
    StatusMismatch,

    /// Updated within the interval
    NotStale,

    /// The pull request closes no issues
    NoLinkedIssues,

    /// Draft issues and other content that has no status to move
    Unsupported,
}

impl Skip {
    /// Level at which a skipped item is logged
    pub fn log_level(self) -> Level {
        match self {
            Skip::AlreadyProcessed | Skip::NoLinkedIssues => Level::Info,
            _ => Level::Debug,
        }
    }
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Skip::AlreadyProcessed => "already processed",
            Skip::StatusMismatch => "status mismatch",
            Skip::NotStale => "not stale",
            Skip::NoLinkedIssues => "no linked issues",
            Skip::Unsupported => "unsupported content",
        };
        f.write_str(text)
    }
}

/// Summary of one scan run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Items looked at
    pub seen: usize,

    /// Items that passed every guard
    pub processed: usize,

    /// Items skipped, by reason
    pub skipped: BTreeMap<Skip, usize>,
}

impl ScanReport {
    fn skip(&mut self, reason: Skip) {
        *self.skipped.entry(reason).or_default() += 1;
    }

    /// Number of items skipped for `reason`
    pub fn skipped_for(&self, reason: Skip) -> usize {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} seen, {} processed", self.seen, self.processed)?;
        for (reason, count) in &self.skipped {
            write!(f, ", {} {}", count, reason)?;
        }
        Ok(())
    }
}

/// Whether something last touched at `updated_at` has been quiet for longer than `interval`
///
/// Strict: an item updated exactly `interval` ago is not stale yet. An
/// interval that overflows the calendar never makes anything stale.
pub fn is_stale(updated_at: DateTime<Utc>, interval: Duration, now: DateTime<Utc>) -> bool {
    updated_at
        .checked_add_signed(interval)
        .is_some_and(|deadline| deadline < now)
}

/// Guard chain for pull request mode
fn pull_request_guard(
    pr: &PullRequest,
    processed_label: &str,
    interval: Duration,
    now: DateTime<Utc>,
) -> Option<Skip> {
    if pr.has_label(processed_label) {
        return Some(Skip::AlreadyProcessed);
    }
    if !is_stale(pr.updated_at, interval, now) {
        return Some(Skip::NotStale);
    }
    if pr.closing_issues.is_empty() {
        return Some(Skip::NoLinkedIssues);
    }
    None
}

/// Scans open pull requests and moves the issues they close
pub struct PullRequestScanner {
    tracker: Arc<dyn IssueTracker>,
    synchronizer: StatusSynchronizer,
    processed_label: String,
    interval: Duration,
    comment: Option<String>,
}

impl PullRequestScanner {
    /// # Arguments
    ///
    /// * `processed_label` - Scan marker label added to every processed PR
    /// * `interval` - How long a PR must be untouched before it is processed
    pub fn new(
        tracker: Arc<dyn IssueTracker>,
        synchronizer: StatusSynchronizer,
        processed_label: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            tracker,
            synchronizer,
            processed_label: processed_label.into(),
            interval,
            comment: None,
        }
    }

    /// Comment posted on every processed PR; None disables comments
    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    /// Process every open PR that passes the guards
    ///
    /// Each passing PR gets its closing issues moved to `target_status`, then
    /// the scan marker label, then the comment. A failing comment is logged
    /// and ignored; any other failure aborts the scan.
    pub async fn scan(
        &self,
        target_status: &str,
        now: DateTime<Utc>,
    ) -> gh_client::Result<ScanReport> {
        let mut report = ScanReport::default();

        for pr in self.tracker.open_pull_requests().await? {
            report.seen += 1;

            if let Some(reason) = pull_request_guard(&pr, &self.processed_label, self.interval, now)
            {
                log!(
                    reason.log_level(),
                    "Skipping PR #{} '{}': {}",
                    pr.number,
                    pr.title,
                    reason
                );
                report.skip(reason);
                continue;
            }

            info!(
                "PR #{} '{}' last updated {} is stale, moving {} issue(s) to '{}'",
                pr.number,
                pr.title,
                pr.updated_at.to_rfc3339(),
                pr.closing_issues.len(),
                target_status
            );

            for issue in &pr.closing_issues {
                self.synchronizer
                    .sync_status(issue, target_status, None)
                    .await?;
            }

            self.tracker
                .add_label(&self.processed_label, &pr.id)
                .await?;

            if let Some(ref comment) = self.comment {
                if let Err(e) = self.tracker.add_comment(&pr.id, comment).await {
                    warn!("Failed to comment on PR #{}: {}", pr.number, e);
                }
            }

            report.processed += 1;
        }

        Ok(report)
    }
}

/// Scans every item of one project board
pub struct ProjectScanner {
    tracker: Arc<dyn IssueTracker>,
    synchronizer: StatusSynchronizer,
    interval: Duration,
}

impl ProjectScanner {
    pub fn new(
        tracker: Arc<dyn IssueTracker>,
        synchronizer: StatusSynchronizer,
        interval: Duration,
    ) -> Self {
        Self {
            tracker,
            synchronizer,
            interval,
        }
    }

    /// Move stale items of board `board_number` from `from_status` to `target_status`
    ///
    /// `from_status` is compared to the item's current status as is, so None
    /// selects items without a status. All pages of the board are visited.
    pub async fn scan(
        &self,
        board_number: u64,
        from_status: Option<&str>,
        target_status: &str,
        now: DateTime<Utc>,
    ) -> gh_client::Result<ScanReport> {
        let mut report = ScanReport::default();
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .tracker
                .project_items(board_number, cursor.as_deref())
                .await?;

            for board_item in &page.items {
                report.seen += 1;
                let item = &board_item.item;

                if item.status.as_deref() != from_status {
                    debug!(
                        "Skipping item {}: status {:?} doesn't match {:?}",
                        item.id, item.status, from_status
                    );
                    report.skip(Skip::StatusMismatch);
                    continue;
                }

                if !is_stale(item.updated_at, self.interval, now) {
                    debug!(
                        "Skipping item {}: last updated at {} which doesn't exceed the interval",
                        item.id,
                        item.updated_at.to_rfc3339()
                    );
                    report.skip(Skip::NotStale);
                    continue;
                }

                let trackable = match board_item.content.as_ref().map(ItemContent::as_trackable) {
                    Some(trackable) => trackable,
                    None => {
                        debug!("Skipping item {}: no issue or pull request behind it", item.id);
                        report.skip(Skip::Unsupported);
                        continue;
                    }
                };

                self.synchronizer
                    .sync_status(trackable, target_status, Some(board_number))
                    .await?;
                report.processed += 1;
            }

            match page.end_cursor {
                Some(next) if page.has_next_page => cursor = Some(next),
                _ => break,
            }
        }

        Ok(report)
    }
}
