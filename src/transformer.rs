//! Template transformer: materialize, dematerialize, and edit sessions
//!
//! Materialization turns a template into a fresh matter; dematerialization
//! strips a matter's instance state back into a reusable template. In-place
//! template editing rides on the same two operations: the template is
//! materialized into a temporary matter, edited through the ordinary matter
//! surface, and dematerialized back into the same template id on save.
//!
//! Stage/task/material identifiers are regenerated on every copy, so two
//! matters created from one template never share structural ids. Attached
//! file ids are the exception: they are blob store keys and must survive the
//! copy unchanged.

use crate::error::StorageError;
use crate::model::{
    new_id, Material, MaterialCategory, Matter, Stage, StatusUpdate, Task, TaskStatus, Template,
};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Id prefix marking a matter as a temporary template-edit instance.
const TEMP_MATTER_PREFIX: &str = "tmp-template-edit-";

/// Whether a matter id denotes a temporary template-edit instance.
pub fn is_temporary_matter(id: &str) -> bool {
    id.starts_with(TEMP_MATTER_PREFIX)
}

/// Deep-copy a stage with fresh structural ids. Attached file ids are kept,
/// everything else is regenerated.
fn copy_stage(stage: &Stage) -> Stage {
    Stage {
        id: new_id(),
        title: stage.title.clone(),
        due_at: stage.due_at,
        tasks: stage.tasks.iter().map(copy_task).collect(),
    }
}

fn copy_task(task: &Task) -> Task {
    Task {
        id: new_id(),
        title: task.title.clone(),
        description: task.description.clone(),
        status: task.status.clone().normalized(),
        note: task.note.clone(),
        updates: task
            .updates
            .iter()
            .map(|u| StatusUpdate {
                id: new_id(),
                content: u.content.clone(),
                created_at: u.created_at,
            })
            .collect(),
        materials: task.materials.iter().map(copy_material).collect(),
        due_at: task.due_at,
        updated_at: Utc::now(),
    }
}

fn copy_material(material: &Material) -> Material {
    Material {
        id: new_id(),
        ..material.clone()
    }
}

/// Materialize a template into a new matter.
///
/// The caller supplies the title and optional due date; an empty title
/// defaults to `"<template name> - <today's date>"`.
pub fn materialize(
    template: &Template,
    title: &str,
    due_at: Option<DateTime<Utc>>,
) -> Matter {
    let title = if title.trim().is_empty() {
        format!("{} - {}", template.name, Utc::now().format("%Y-%m-%d"))
    } else {
        title.trim().to_string()
    };

    // Title is never empty here, so construction cannot fail.
    let mut matter =
        Matter::new(title, String::new()).expect("materialized title is non-empty");
    matter.due_at = due_at;
    matter.stages = template.stages.iter().map(copy_stage).collect();
    matter.touch();

    debug!(
        template_id = %template.id,
        matter_id = %matter.id,
        stages = matter.stages.len(),
        "Materialized template"
    );
    matter
}

/// Dematerialize a matter's structure into a new template.
///
/// Instance state is stripped: every task resets to `Pending` with an empty
/// note and no status updates. Materials are preserved, but readiness is
/// recomputed to "has at least one file" and the category is forced to
/// `Reference` - an artifact that already exists is example material for
/// future instances, not an outstanding deliverable.
///
/// An empty name falls back to the matter title; when both are blank the
/// operation is rejected before anything reaches a store.
pub fn dematerialize(
    matter: &Matter,
    name: &str,
    description: &str,
) -> Result<Template, StorageError> {
    let name = if name.trim().is_empty() {
        matter.title.clone()
    } else {
        name.trim().to_string()
    };

    let stages = matter
        .stages
        .iter()
        .map(|stage| {
            let mut stage = copy_stage(stage);
            for task in &mut stage.tasks {
                task.status = TaskStatus::Pending;
                task.note.clear();
                task.updates.clear();
                for material in &mut task.materials {
                    material.ready = material.has_attachment();
                    material.category = MaterialCategory::Reference;
                }
            }
            stage
        })
        .collect();

    let mut template = Template::new(name, description)?;
    template.stages = stages;

    debug!(
        matter_id = %matter.id,
        template_id = %template.id,
        "Dematerialized matter"
    );
    Ok(template)
}

/// An open in-place template edit.
pub struct EditSession {
    template_id: String,
    description: String,
    matter: Matter,
}

/// Single-slot coordinator for in-place template editing.
///
/// At most one temporary matter may be open for editing at a time; starting
/// a second edit before saving or canceling the first is rejected.
#[derive(Default)]
pub struct TemplateEditor {
    session: Option<EditSession>,
}

impl TemplateEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_editing(&self) -> bool {
        self.session.is_some()
    }

    /// Open an edit session by materializing the template into a temporary
    /// matter.
    pub fn begin(&mut self, template: &Template) -> Result<&mut Matter, StorageError> {
        if self.session.is_some() {
            return Err(StorageError::EditInProgress);
        }

        let mut matter = materialize(template, &template.name, None);
        matter.id = format!("{TEMP_MATTER_PREFIX}{}", new_id());

        self.session = Some(EditSession {
            template_id: template.id.clone(),
            description: template.description.clone(),
            matter,
        });
        Ok(&mut self.session.as_mut().expect("just set").matter)
    }

    /// The temporary matter under edit, if a session is open.
    pub fn matter_mut(&mut self) -> Option<&mut Matter> {
        self.session.as_mut().map(|s| &mut s.matter)
    }

    /// Close the session, dematerializing the temporary matter back into a
    /// template that keeps the original template id. The caller persists the
    /// returned template over the old one. On a validation failure (e.g. a
    /// cleared-out title) the session stays open so the edits can be fixed.
    pub fn save(&mut self) -> Result<Template, StorageError> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| StorageError::Validation("no edit session open".to_string()))?;

        let mut template =
            dematerialize(&session.matter, &session.matter.title, &session.description)?;
        template.id = session.template_id.clone();
        self.session = None;
        Ok(template)
    }

    /// Discard the session without persisting anything.
    pub fn cancel(&mut self) {
        self.session = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AttachedFile;

    fn sample_template() -> Template {
        let mut template = Template::new("Deal flow", "Standard deal").unwrap();
        let mut stage = Stage::new("Negotiation");
        let mut task = Task::new("Sign contract");
        task.materials
            .push(Material::new("Contract draft", MaterialCategory::Reference));
        stage.tasks.push(task);
        template.stages = vec![stage];
        template
    }

    #[test]
    fn test_materialize_is_fresh() {
        let template = sample_template();
        let matter = materialize(&template, "Acme Deal", None);

        assert_ne!(matter.id, template.id);
        assert!(!matter.archived);
        assert!(matter.judgments.is_empty());
        assert!(matter.dismissed_attention.is_empty());
        assert_eq!(matter.stages.len(), 1);
        assert_eq!(matter.stages[0].tasks[0].status, TaskStatus::Pending);
    }

    #[test]
    fn test_materialize_regenerates_structural_ids() {
        let template = sample_template();
        let a = materialize(&template, "First", None);
        let b = materialize(&template, "Second", None);

        assert_ne!(a.stages[0].id, template.stages[0].id);
        assert_ne!(a.stages[0].id, b.stages[0].id);
        assert_ne!(a.stages[0].tasks[0].id, b.stages[0].tasks[0].id);
        assert_ne!(
            a.stages[0].tasks[0].materials[0].id,
            b.stages[0].tasks[0].materials[0].id
        );
    }

    #[test]
    fn test_materialize_keeps_blob_links() {
        let mut template = sample_template();
        template.stages[0].tasks[0].materials[0]
            .attach_file(AttachedFile::new("blob-1", "a.pdf", "application/pdf", 3));

        let matter = materialize(&template, "Acme Deal", None);
        let ids: Vec<&str> = matter.blob_ids().collect();
        assert_eq!(ids, vec!["blob-1"]);
    }

    #[test]
    fn test_materialize_default_title() {
        let template = sample_template();
        let matter = materialize(&template, "  ", None);
        let today = Utc::now().format("%Y-%m-%d").to_string();
        assert_eq!(matter.title, format!("Deal flow - {today}"));
    }

    #[test]
    fn test_dematerialize_strips_instance_state() {
        let template = sample_template();
        let mut matter = materialize(&template, "Acme Deal", None);
        let task_id = matter.stages[0].tasks[0].id.clone();
        matter
            .set_task_status(&task_id, TaskStatus::other("stalled"))
            .unwrap();
        matter.add_status_update(&task_id, "called them twice").unwrap();
        matter.task_mut(&task_id).unwrap().note = "old note".to_string();
        matter.add_judgment("looking good", None);

        let result = dematerialize(&matter, "Deal flow v2", "").unwrap();
        let task = &result.stages[0].tasks[0];
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.note.is_empty());
        assert!(task.updates.is_empty());
    }

    #[test]
    fn test_dematerialize_reflags_materials() {
        let template = sample_template();
        let mut matter = materialize(&template, "Acme Deal", None);
        let material_id = matter.stages[0].tasks[0].materials[0].id.clone();

        // Without a file: not ready, even if the instance said otherwise.
        matter.material_mut(&material_id).unwrap().set_ready(true);
        matter.material_mut(&material_id).unwrap().category = MaterialCategory::Deliverable;
        let without_file = dematerialize(&matter, "T", "").unwrap();
        let mat = &without_file.stages[0].tasks[0].materials[0];
        assert!(!mat.ready);
        assert_eq!(mat.category, MaterialCategory::Reference);

        // With a file: ready, category still forced to reference.
        matter
            .attach_file(
                &material_id,
                AttachedFile::new("blob-1", "signed.pdf", "application/pdf", 9),
            )
            .unwrap();
        let with_file = dematerialize(&matter, "T", "").unwrap();
        let mat = &with_file.stages[0].tasks[0].materials[0];
        assert!(mat.ready);
        assert_eq!(mat.category, MaterialCategory::Reference);
        assert_eq!(mat.files.len(), 1, "files travel with the template");
    }

    #[test]
    fn test_edit_session_roundtrip_keeps_template_id() {
        let template = sample_template();
        let mut editor = TemplateEditor::new();

        let matter = editor.begin(&template).unwrap();
        assert!(is_temporary_matter(&matter.id));
        matter.add_stage("Closing");

        let saved = editor.save().unwrap();
        assert_eq!(saved.id, template.id);
        assert_eq!(saved.stages.len(), 2);
        assert_eq!(saved.description, "Standard deal");
        assert!(!editor.is_editing());
    }

    #[test]
    fn test_save_with_blank_title_keeps_session_open() {
        let template = sample_template();
        let mut editor = TemplateEditor::new();

        let matter = editor.begin(&template).unwrap();
        matter.title = "   ".to_string();

        assert!(matches!(editor.save(), Err(StorageError::Validation(_))));
        assert!(editor.is_editing(), "failed save must not drop the edits");

        editor.matter_mut().unwrap().title = "Deal flow".to_string();
        let saved = editor.save().unwrap();
        assert_eq!(saved.id, template.id);
        assert!(!editor.is_editing());
    }

    #[test]
    fn test_dematerialize_rejects_blank_name_and_title() {
        let template = sample_template();
        let mut matter = materialize(&template, "Acme Deal", None);
        matter.title = String::new();

        assert!(matches!(
            dematerialize(&matter, "  ", ""),
            Err(StorageError::Validation(_))
        ));
    }

    #[test]
    fn test_only_one_edit_session() {
        let template = sample_template();
        let mut editor = TemplateEditor::new();

        editor.begin(&template).unwrap();
        assert!(matches!(
            editor.begin(&template),
            Err(StorageError::EditInProgress)
        ));

        editor.cancel();
        assert!(editor.begin(&template).is_ok());
    }

    #[test]
    fn test_cancel_discards_edits() {
        let template = sample_template();
        let mut editor = TemplateEditor::new();

        let matter = editor.begin(&template).unwrap();
        matter.add_stage("Should vanish");
        editor.cancel();

        assert!(editor.matter_mut().is_none());
        assert!(matches!(editor.save(), Err(StorageError::Validation(_))));
    }
}
