//! Single-entity actions
//!
//! Each function handles one pull request or issue, as triggered by a
//! workflow event.

use crate::error::{Error, Result};
use crate::status::StatusSynchronizer;
use gh_client::IssueTracker;
use log::{debug, info, warn};

/// A pull request changed: move its issues and clear the scan marker
///
/// The marker label is removed so a later scan looks at the PR again.
/// `comment` is posted on the PR afterwards unless None.
pub async fn pull_request_updated(
    tracker: &dyn IssueTracker,
    synchronizer: &StatusSynchronizer,
    pull_number: u64,
    target_status: &str,
    processed_label: &str,
    comment: Option<&str>,
) -> Result<()> {
    let pr = tracker.pull_request(pull_number).await?;

    if pr.closing_issues.is_empty() {
        info!("PR #{} closes no issues, nothing to do", pr.number);
        return Ok(());
    }

    for issue in &pr.closing_issues {
        synchronizer.sync_status(issue, target_status, None).await?;
    }

    if pr.has_label(processed_label) {
        tracker.remove_label(processed_label, &pr.id).await?;
    } else {
        debug!("PR #{} has no '{}' label to remove", pr.number, processed_label);
    }

    if let Some(comment) = comment {
        if let Err(e) = tracker.add_comment(&pr.id, comment).await {
            warn!("Failed to comment on PR #{}: {}", pr.number, e);
        }
    }

    Ok(())
}

/// Put an issue on a project board
///
/// Returns the ID of the board item.
pub async fn assign_issue(
    tracker: &dyn IssueTracker,
    issue_number: u64,
    project_number: u64,
) -> Result<String> {
    let issue = tracker.issue(issue_number).await?;
    let board = tracker.project_board(project_number).await?;

    let item_id = tracker.attach_to_project(&board.id, &issue.id).await?;
    info!(
        "Added issue #{} '{}' to board #{} '{}'",
        issue.number, issue.title, board.number, board.title
    );
    Ok(item_id)
}

/// Move one issue on one board
///
/// With `from_status` set, the issue is only moved while its status on the
/// board equals `from_status`; otherwise this is a no-op.
///
/// # Errors
///
/// `Error::ProjectNotAttached` if the issue is not on board `project_number`.
pub async fn update_issue(
    tracker: &dyn IssueTracker,
    synchronizer: &StatusSynchronizer,
    issue_number: u64,
    project_number: u64,
    target_status: &str,
    from_status: Option<&str>,
) -> Result<bool> {
    let issue = tracker.issue(issue_number).await?;

    let attachment = issue
        .attachments
        .iter()
        .find(|a| a.board.number == project_number)
        .ok_or(Error::ProjectNotAttached {
            issue: issue_number,
            project: project_number,
        })?;

    if let Some(from) = from_status {
        let current = attachment.item.status.as_deref();
        if current != Some(from) {
            info!(
                "Issue #{} has status {:?} on board #{}, not '{}', leaving it",
                issue.number, current, project_number, from
            );
            return Ok(false);
        }
    }

    Ok(synchronizer
        .sync_status(&issue, target_status, Some(project_number))
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{attachment, board, days_ago, issue, pull_request, Call, FakeTracker};
    use std::sync::Arc;

    const LABEL: &str = "caretaker-processed";
    const COMMENT: &str = "Update detected, any open associated issue has been transfer to In Progress.";

    fn synchronizer(fake: &Arc<FakeTracker>) -> StatusSynchronizer {
        StatusSynchronizer::new(fake.clone(), false)
    }

    #[tokio::test]
    async fn test_pull_request_updated() {
        let fake = Arc::new(FakeTracker::default());
        fake.define_label(LABEL);
        let mut pr = pull_request(
            5,
            days_ago(0),
            vec![issue(
                1,
                vec![attachment(board(1, &["Todo", "In Progress"]), "PVTI_1", Some("Todo"))],
            )],
        );
        pr.labels.push(LABEL.to_string());
        fake.add_pull_request(pr);

        pull_request_updated(
            &*fake,
            &synchronizer(&fake),
            5,
            "In Progress",
            LABEL,
            Some(COMMENT),
        )
        .await
        .unwrap();

        assert_eq!(
            fake.writes(),
            vec![
                Call::UpdateStatus {
                    item_id: "PVTI_1".into(),
                    status: "In Progress".into()
                },
                Call::RemoveLabel {
                    label: LABEL.into(),
                    target: "PR_5".into()
                },
                Call::Comment {
                    target: "PR_5".into(),
                    body: COMMENT.into()
                },
            ]
        );
        assert!(!fake.pr_snapshot(5).has_label(LABEL));
    }

    #[tokio::test]
    async fn test_pull_request_updated_without_issues() {
        let fake = Arc::new(FakeTracker::default());
        fake.add_pull_request(pull_request(5, days_ago(0), vec![]));

        pull_request_updated(
            &*fake,
            &synchronizer(&fake),
            5,
            "In Progress",
            LABEL,
            Some(COMMENT),
        )
        .await
        .unwrap();

        assert!(fake.writes().is_empty());
    }

    #[tokio::test]
    async fn test_assign_issue() {
        let fake = Arc::new(FakeTracker::default());
        fake.add_issue(issue(12, vec![]));
        fake.add_board(board(3, &["Todo"]), vec![]);

        let item_id = assign_issue(&*fake, 12, 3).await.unwrap();

        assert_eq!(item_id, "PVTI_I_12");
        assert_eq!(
            fake.writes(),
            vec![Call::Attach {
                board: "PVT_3".into(),
                content: "I_12".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_update_issue_requires_attachment() {
        let fake = Arc::new(FakeTracker::default());
        fake.add_issue(issue(
            12,
            vec![attachment(board(1, &["Todo", "Done"]), "PVTI_1", Some("Todo"))],
        ));

        let err = update_issue(&*fake, &synchronizer(&fake), 12, 2, "Done", None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::ProjectNotAttached {
                issue: 12,
                project: 2
            }
        ));
    }

    #[tokio::test]
    async fn test_update_issue_from_status_guard() {
        let fake = Arc::new(FakeTracker::default());
        fake.add_issue(issue(
            12,
            vec![
                attachment(board(1, &["Todo", "Done"]), "PVTI_1", Some("Todo")),
                attachment(board(2, &["Todo", "Done"]), "PVTI_2", Some("Todo")),
            ],
        ));
        let sync = synchronizer(&fake);

        let moved = update_issue(&*fake, &sync, 12, 1, "Done", Some("Backlog"))
            .await
            .unwrap();
        assert!(!moved);
        assert!(fake.writes().is_empty());

        let moved = update_issue(&*fake, &sync, 12, 1, "Done", Some("Todo"))
            .await
            .unwrap();
        assert!(moved);
        assert_eq!(
            fake.writes(),
            vec![Call::UpdateStatus {
                item_id: "PVTI_1".into(),
                status: "Done".into()
            }]
        );
    }
}
