//! Read-only attention scan over due timestamps
//!
//! Feeds the notification collaborator: which matters and tasks are overdue
//! or coming due. Never mutates the document model. Dismissals live on the
//! matter (task ids, or the `"overdue"` sentinel for the matter-level due
//! date) and are honored here.

use crate::model::Matter;
use crate::transformer::is_temporary_matter;
use chrono::{DateTime, Duration, Utc};

/// Dismissal id covering a matter's own due date.
pub const OVERDUE_SENTINEL: &str = "overdue";

/// One item needing the user's attention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttentionItem {
    pub matter_id: String,
    /// Set for task-level items, `None` for the matter's own due date.
    pub task_id: Option<String>,
    pub title: String,
    pub due_at: DateTime<Utc>,
    pub overdue: bool,
}

/// Scan matters for overdue and upcoming due dates.
///
/// Archived matters and temporary template-edit instances are excluded, as
/// are closed tasks (completed or skipped) and anything the user dismissed.
pub fn scan(matters: &[Matter], now: DateTime<Utc>, upcoming_window: Duration) -> Vec<AttentionItem> {
    let horizon = now + upcoming_window;
    let mut items = Vec::new();

    for matter in matters {
        if matter.archived || is_temporary_matter(&matter.id) {
            continue;
        }

        if let Some(due_at) = matter.due_at {
            if due_at <= horizon && !matter.dismissed_attention.contains(OVERDUE_SENTINEL) {
                items.push(AttentionItem {
                    matter_id: matter.id.clone(),
                    task_id: None,
                    title: matter.title.clone(),
                    due_at,
                    overdue: due_at <= now,
                });
            }
        }

        for task in matter.stages.iter().flat_map(|s| s.tasks.iter()) {
            let Some(due_at) = task.due_at else { continue };
            if task.status.is_closed()
                || due_at > horizon
                || matter.dismissed_attention.contains(&task.id)
            {
                continue;
            }
            items.push(AttentionItem {
                matter_id: matter.id.clone(),
                task_id: Some(task.id.clone()),
                title: task.title.clone(),
                due_at,
                overdue: due_at <= now,
            });
        }
    }

    items.sort_by_key(|item| item.due_at);
    items
}
