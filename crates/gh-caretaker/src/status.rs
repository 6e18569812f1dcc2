//! Status synchronization across project boards
//!
//! An issue or pull request can sit on several boards at once, and each board
//! has its own "Status" options. `StatusSynchronizer` moves the item to a
//! named status on every board that offers it.

use gh_client::{IssueTracker, Trackable};
use log::{debug, info};
use std::sync::Arc;

#[derive(Clone)]
pub struct StatusSynchronizer {
    tracker: Arc<dyn IssueTracker>,
    move_closed: bool,
}

impl StatusSynchronizer {
    pub fn new(tracker: Arc<dyn IssueTracker>, move_closed: bool) -> Self {
        Self {
            tracker,
            move_closed,
        }
    }

    /// Move `item` to `target_status` on its boards
    ///
    /// With `target_project` set, only the board with that number is touched.
    /// Boards without an option named `target_status` are skipped, as are
    /// boards where the item already has that status.
    ///
    /// Returns whether at least one board was changed.
    ///
    /// # Errors
    ///
    /// The first failed mutation is returned as is. Boards updated before the
    /// failure keep their new status; there is no rollback.
    pub async fn sync_status(
        &self,
        item: &dyn Trackable,
        target_status: &str,
        target_project: Option<u64>,
    ) -> gh_client::Result<bool> {
        if item.is_closed() && !self.move_closed {
            debug!("#{} '{}' is closed, not moving it", item.number(), item.title());
            return Ok(false);
        }

        let target_project = target_project.filter(|n| *n > 0);
        let mut changed = false;

        for attachment in item.attachments() {
            let board = &attachment.board;

            if target_project.is_some_and(|n| n != board.number) {
                continue;
            }

            let (Some(field), Some(option)) = (
                board.status_field.as_ref(),
                board.status_option(target_status),
            ) else {
                debug!(
                    "Board #{} '{}' has no status '{}', skipping #{}",
                    board.number,
                    board.title,
                    target_status,
                    item.number()
                );
                continue;
            };

            if attachment.item.status.as_deref() == Some(target_status) {
                debug!(
                    "#{} is already '{}' on board #{}",
                    item.number(),
                    target_status,
                    board.number
                );
                continue;
            }

            self.tracker
                .update_item_status(&board.id, &attachment.item.id, &field.id, &option.id)
                .await?;

            info!(
                "Moved #{} '{}' to '{}' on board #{}",
                item.number(),
                item.title(),
                target_status,
                board.number
            );
            changed = true;
        }

        Ok(changed)
    }
}
