//! Tasks, task status, and status updates

use super::{new_id, Material};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Label substituted when an `Other` status is created without one.
pub const DEFAULT_OTHER_LABEL: &str = "custom";

/// Task status.
///
/// Six fixed states plus a free-text escape hatch. `Other` always carries a
/// non-empty label; constructors substitute [`DEFAULT_OTHER_LABEL`] when the
/// caller provides none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Blocked,
    Skipped,
    Exception,
    Other { label: String },
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

impl TaskStatus {
    /// Build an `Other` status, falling back to the default label when the
    /// given one is blank.
    pub fn other(label: impl Into<String>) -> Self {
        let label = label.into();
        let label = label.trim();
        if label.is_empty() {
            TaskStatus::Other {
                label: DEFAULT_OTHER_LABEL.to_string(),
            }
        } else {
            TaskStatus::Other {
                label: label.to_string(),
            }
        }
    }

    /// Re-apply the `Other` label invariant to an arbitrary status value.
    pub fn normalized(self) -> Self {
        match self {
            TaskStatus::Other { label } => TaskStatus::other(label),
            other => other,
        }
    }

    /// Whether the task no longer needs attention (done or deliberately
    /// passed over).
    pub fn is_closed(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Skipped)
    }
}

/// A dated free-text progress note on a task. Immutable once created;
/// removable by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl StatusUpdate {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// A single actionable step within a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    /// Legacy single status note, kept for data written before the
    /// status-update log existed.
    #[serde(default)]
    pub note: String,
    /// Progress log, newest first.
    #[serde(default)]
    pub updates: Vec<StatusUpdate>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            description: None,
            status: TaskStatus::Pending,
            note: String::new(),
            updates: Vec::new(),
            materials: Vec::new(),
            due_at: None,
            updated_at: Utc::now(),
        }
    }

    /// Set the status, enforcing the `Other` label invariant.
    pub fn set_status(&mut self, status: TaskStatus) {
        self.status = status.normalized();
        self.updated_at = Utc::now();
    }

    /// Prepend a status update (the log is newest first) and return its id.
    pub fn add_update(&mut self, content: impl Into<String>) -> String {
        let update = StatusUpdate::new(content);
        let id = update.id.clone();
        self.updates.insert(0, update);
        self.updated_at = Utc::now();
        id
    }

    /// Remove a status update by id. Returns whether anything was removed.
    pub fn remove_update(&mut self, update_id: &str) -> bool {
        let before = self.updates.len();
        self.updates.retain(|u| u.id != update_id);
        let removed = self.updates.len() != before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    pub fn material_mut(&mut self, material_id: &str) -> Option<&mut Material> {
        self.materials.iter_mut().find(|m| m.id == material_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_status_gets_placeholder_label() {
        assert_eq!(
            TaskStatus::other("  "),
            TaskStatus::Other {
                label: DEFAULT_OTHER_LABEL.to_string()
            }
        );
        assert_eq!(
            TaskStatus::other("awaiting counsel"),
            TaskStatus::Other {
                label: "awaiting counsel".to_string()
            }
        );
    }

    #[test]
    fn test_normalized_fixes_empty_label() {
        let status = TaskStatus::Other {
            label: String::new(),
        };
        assert_eq!(
            status.normalized(),
            TaskStatus::Other {
                label: DEFAULT_OTHER_LABEL.to_string()
            }
        );
        assert_eq!(TaskStatus::Blocked.normalized(), TaskStatus::Blocked);
    }

    #[test]
    fn test_updates_are_newest_first() {
        let mut task = Task::new("Sign contract");
        task.add_update("drafted");
        task.add_update("sent for review");

        assert_eq!(task.updates.len(), 2);
        assert_eq!(task.updates[0].content, "sent for review");
        assert_eq!(task.updates[1].content, "drafted");
    }

    #[test]
    fn test_remove_update_by_id() {
        let mut task = Task::new("Sign contract");
        let id = task.add_update("drafted");
        assert!(task.remove_update(&id));
        assert!(!task.remove_update(&id));
        assert!(task.updates.is_empty());
    }

    #[test]
    fn test_status_serde_shape() {
        let json = serde_json::to_value(TaskStatus::other("on hold")).unwrap();
        assert_eq!(json["kind"], "other");
        assert_eq!(json["label"], "on hold");

        let json = serde_json::to_value(TaskStatus::InProgress).unwrap();
        assert_eq!(json["kind"], "in_progress");
    }
}
