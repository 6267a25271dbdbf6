//! Matters, stages, and the judgment log

use super::{new_id, AttachedFile, Material, Task, TaskStatus};
use crate::error::StorageError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An ordered group of tasks within a matter or template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
}

impl Stage {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            tasks: Vec::new(),
            due_at: None,
        }
    }
}

/// One entry in a matter's append-only judgment/narrative log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgmentRecord {
    pub id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A live case instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matter {
    pub id: String,
    pub title: String,
    /// Free-text type/category ("contract", "dispute", ...).
    #[serde(default)]
    pub matter_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub stages: Vec<Stage>,
    /// Append-only narrative/judgment history.
    #[serde(default)]
    pub judgments: Vec<JudgmentRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_situation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_status: Option<String>,
    /// Attention items the user has dismissed: task ids, or the sentinel
    /// `"overdue"` for the matter-level due date.
    #[serde(default)]
    pub dismissed_attention: BTreeSet<String>,
}

impl Matter {
    /// Create an empty matter. An empty title is rejected before anything
    /// reaches a store.
    pub fn new(
        title: impl Into<String>,
        matter_type: impl Into<String>,
    ) -> Result<Self, StorageError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(StorageError::Validation(
                "matter title must not be empty".to_string(),
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id: new_id(),
            title,
            matter_type: matter_type.into(),
            due_at: None,
            created_at: now,
            updated_at: now,
            archived: false,
            stages: Vec::new(),
            judgments: Vec::new(),
            current_situation: None,
            overall_status: None,
            dismissed_attention: BTreeSet::new(),
        })
    }

    /// Refresh the last-updated timestamp. Every mutating operation below
    /// calls this.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    // ------------------------------------------------------------------
    // Stage operations
    // ------------------------------------------------------------------

    pub fn add_stage(&mut self, title: impl Into<String>) -> String {
        let stage = Stage::new(title);
        let id = stage.id.clone();
        self.stages.push(stage);
        self.touch();
        id
    }

    pub fn stage_mut(&mut self, stage_id: &str) -> Option<&mut Stage> {
        self.stages.iter_mut().find(|s| s.id == stage_id)
    }

    /// Remove a stage and everything it owns. Referenced blobs are not
    /// touched; the GC sweep reclaims them later.
    pub fn remove_stage(&mut self, stage_id: &str) -> bool {
        let before = self.stages.len();
        self.stages.retain(|s| s.id != stage_id);
        let removed = self.stages.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    // ------------------------------------------------------------------
    // Task operations
    // ------------------------------------------------------------------

    pub fn add_task(
        &mut self,
        stage_id: &str,
        title: impl Into<String>,
    ) -> Result<String, StorageError> {
        let stage = self
            .stage_mut(stage_id)
            .ok_or_else(|| StorageError::NotFound(format!("stage {stage_id}")))?;
        let task = Task::new(title);
        let id = task.id.clone();
        stage.tasks.push(task);
        self.touch();
        Ok(id)
    }

    /// Find a task anywhere in the matter. Lookups are scoped to one matter,
    /// so ids only need to be unique within it.
    pub fn task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.stages
            .iter_mut()
            .flat_map(|s| s.tasks.iter_mut())
            .find(|t| t.id == task_id)
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.stages
            .iter()
            .flat_map(|s| s.tasks.iter())
            .find(|t| t.id == task_id)
    }

    pub fn remove_task(&mut self, task_id: &str) -> bool {
        let mut removed = false;
        for stage in &mut self.stages {
            let before = stage.tasks.len();
            stage.tasks.retain(|t| t.id != task_id);
            removed |= stage.tasks.len() != before;
        }
        if removed {
            self.touch();
        }
        removed
    }

    pub fn set_task_status(
        &mut self,
        task_id: &str,
        status: TaskStatus,
    ) -> Result<(), StorageError> {
        let task = self
            .task_mut(task_id)
            .ok_or_else(|| StorageError::NotFound(format!("task {task_id}")))?;
        task.set_status(status);
        self.touch();
        Ok(())
    }

    pub fn add_status_update(
        &mut self,
        task_id: &str,
        content: impl Into<String>,
    ) -> Result<String, StorageError> {
        let task = self
            .task_mut(task_id)
            .ok_or_else(|| StorageError::NotFound(format!("task {task_id}")))?;
        let id = task.add_update(content);
        self.touch();
        Ok(id)
    }

    pub fn remove_status_update(
        &mut self,
        task_id: &str,
        update_id: &str,
    ) -> Result<bool, StorageError> {
        let task = self
            .task_mut(task_id)
            .ok_or_else(|| StorageError::NotFound(format!("task {task_id}")))?;
        let removed = task.remove_update(update_id);
        if removed {
            self.touch();
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Material operations
    // ------------------------------------------------------------------

    pub fn add_material(
        &mut self,
        task_id: &str,
        material: Material,
    ) -> Result<String, StorageError> {
        let task = self
            .task_mut(task_id)
            .ok_or_else(|| StorageError::NotFound(format!("task {task_id}")))?;
        let id = material.id.clone();
        task.materials.push(material);
        task.updated_at = Utc::now();
        self.touch();
        Ok(id)
    }

    pub fn material_mut(&mut self, material_id: &str) -> Option<&mut Material> {
        self.stages
            .iter_mut()
            .flat_map(|s| s.tasks.iter_mut())
            .flat_map(|t| t.materials.iter_mut())
            .find(|m| m.id == material_id)
    }

    pub fn attach_file(
        &mut self,
        material_id: &str,
        file: AttachedFile,
    ) -> Result<(), StorageError> {
        let material = self
            .material_mut(material_id)
            .ok_or_else(|| StorageError::NotFound(format!("material {material_id}")))?;
        material.attach_file(file);
        self.touch();
        Ok(())
    }

    pub fn remove_file(
        &mut self,
        material_id: &str,
        file_id: &str,
    ) -> Result<bool, StorageError> {
        let material = self
            .material_mut(material_id)
            .ok_or_else(|| StorageError::NotFound(format!("material {material_id}")))?;
        let removed = material.remove_file(file_id);
        if removed {
            self.touch();
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Judgment log and attention
    // ------------------------------------------------------------------

    /// Append a judgment record. The log is append-only; there is no edit
    /// or remove operation.
    pub fn add_judgment(
        &mut self,
        content: impl Into<String>,
        status: Option<String>,
    ) -> String {
        let record = JudgmentRecord {
            id: new_id(),
            content: content.into(),
            status,
            created_at: Utc::now(),
        };
        let id = record.id.clone();
        self.judgments.push(record);
        self.touch();
        id
    }

    pub fn dismiss_attention(&mut self, attention_id: impl Into<String>) {
        self.dismissed_attention.insert(attention_id.into());
        self.touch();
    }

    pub fn restore_attention(&mut self, attention_id: &str) {
        if self.dismissed_attention.remove(attention_id) {
            self.touch();
        }
    }

    /// Every blob id referenced anywhere in this matter.
    pub fn blob_ids(&self) -> impl Iterator<Item = &str> {
        self.stages
            .iter()
            .flat_map(|s| s.tasks.iter())
            .flat_map(|t| t.materials.iter())
            .flat_map(|m| m.blob_ids())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MaterialCategory;

    #[test]
    fn test_empty_title_rejected() {
        assert!(matches!(
            Matter::new("  ", "contract"),
            Err(StorageError::Validation(_))
        ));
    }

    #[test]
    fn test_edits_refresh_updated_at() {
        let mut matter = Matter::new("Acme Deal", "contract").unwrap();
        let stamp = matter.updated_at;

        let stage_id = matter.add_stage("Negotiation");
        let task_id = matter.add_task(&stage_id, "Sign contract").unwrap();
        matter
            .set_task_status(&task_id, TaskStatus::InProgress)
            .unwrap();

        assert!(matter.updated_at >= stamp);
        assert_eq!(
            matter.task(&task_id).unwrap().status,
            TaskStatus::InProgress
        );
    }

    #[test]
    fn test_task_lookup_on_missing_id() {
        let mut matter = Matter::new("Acme Deal", "contract").unwrap();
        assert!(matches!(
            matter.set_task_status("nope", TaskStatus::Completed),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn test_stage_removal_cascades_to_tasks() {
        let mut matter = Matter::new("Acme Deal", "contract").unwrap();
        let stage_id = matter.add_stage("Negotiation");
        let task_id = matter.add_task(&stage_id, "Sign contract").unwrap();

        assert!(matter.remove_stage(&stage_id));
        assert!(matter.task(&task_id).is_none());
    }

    #[test]
    fn test_judgment_log_appends() {
        let mut matter = Matter::new("Acme Deal", "contract").unwrap();
        matter.add_judgment("Filed initial brief", Some("on track".to_string()));
        matter.add_judgment("Opposing counsel responded", None);

        assert_eq!(matter.judgments.len(), 2);
        assert_eq!(matter.judgments[0].content, "Filed initial brief");
    }

    #[test]
    fn test_blob_ids_walk_the_whole_tree() {
        let mut matter = Matter::new("Acme Deal", "contract").unwrap();
        let stage_id = matter.add_stage("Negotiation");
        let task_id = matter.add_task(&stage_id, "Sign contract").unwrap();

        let mut material = Material::new("Contract draft", MaterialCategory::Deliverable);
        material.file_id = Some("legacy-1".to_string());
        let material_id = matter.add_material(&task_id, material).unwrap();
        matter
            .attach_file(
                &material_id,
                AttachedFile::new("blob-1", "signed.pdf", "application/pdf", 9),
            )
            .unwrap();

        let ids: Vec<&str> = matter.blob_ids().collect();
        assert_eq!(ids, vec!["legacy-1", "blob-1"]);
    }

    #[test]
    fn test_dismissed_attention_roundtrip() {
        let mut matter = Matter::new("Acme Deal", "contract").unwrap();
        matter.dismiss_attention("overdue");
        assert!(matter.dismissed_attention.contains("overdue"));
        matter.restore_attention("overdue");
        assert!(matter.dismissed_attention.is_empty());
    }
}
