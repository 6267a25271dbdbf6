//! Materials and attached files

use super::new_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What role a material plays within its task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialCategory {
    /// Blueprint or example material carried along for reference.
    Reference,
    /// An output still expected from the task. Absent category in stored
    /// data means deliverable, hence the default.
    #[default]
    Deliverable,
}

/// Metadata record for one uploaded file.
///
/// `id` is the blob store key and the only link between the document model
/// and the stored bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub attached_at: DateTime<Utc>,
}

impl AttachedFile {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        mime_type: impl Into<String>,
        size: u64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mime_type: mime_type.into(),
            size,
            attached_at: Utc::now(),
        }
    }
}

/// A named requirement within a task.
///
/// Readiness invariant: `ready` is true iff at least one file is attached
/// (legacy single-file reference or the new-style list), or the flag was
/// explicitly set for materials that need no upload. Removing the last file
/// drops the flag back to false; it is never silently turned on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub category: MaterialCategory,
    /// Legacy single-file reference, kept for data written before
    /// multi-file attachments existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub files: Vec<AttachedFile>,
}

impl Material {
    pub fn new(name: impl Into<String>, category: MaterialCategory) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            ready: false,
            category,
            file_id: None,
            file_name: None,
            file_type: None,
            file_size: None,
            files: Vec::new(),
        }
    }

    /// Whether any file is attached, legacy or new-style.
    pub fn has_attachment(&self) -> bool {
        self.file_id.is_some() || !self.files.is_empty()
    }

    /// Attach a file and mark the material ready.
    pub fn attach_file(&mut self, file: AttachedFile) {
        self.files.push(file);
        self.ready = true;
    }

    /// Detach a file by id. When the last file goes, readiness goes with it.
    pub fn remove_file(&mut self, file_id: &str) -> bool {
        let before = self.files.len();
        self.files.retain(|f| f.id != file_id);
        let removed = self.files.len() != before;
        if removed && !self.has_attachment() {
            self.ready = false;
        }
        removed
    }

    /// Drop the legacy single-file reference, if any.
    pub fn clear_legacy_file(&mut self) {
        self.file_id = None;
        self.file_name = None;
        self.file_type = None;
        self.file_size = None;
        if !self.has_attachment() {
            self.ready = false;
        }
    }

    /// Explicit readiness toggle for materials that need no upload
    /// (reference materials marked ready by hand).
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Every blob id this material references.
    pub fn blob_ids(&self) -> impl Iterator<Item = &str> {
        self.file_id
            .as_deref()
            .into_iter()
            .chain(self.files.iter().map(|f| f.id.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_sets_ready() {
        let mut mat = Material::new("Contract draft", MaterialCategory::Deliverable);
        assert!(!mat.ready);

        mat.attach_file(AttachedFile::new("blob-1", "draft.pdf", "application/pdf", 1024));
        assert!(mat.ready);
        assert!(mat.has_attachment());
    }

    #[test]
    fn test_removing_last_file_drops_ready() {
        let mut mat = Material::new("Contract draft", MaterialCategory::Deliverable);
        mat.attach_file(AttachedFile::new("blob-1", "a.pdf", "application/pdf", 1));
        mat.attach_file(AttachedFile::new("blob-2", "b.pdf", "application/pdf", 2));

        assert!(mat.remove_file("blob-1"));
        assert!(mat.ready, "one file still attached");

        assert!(mat.remove_file("blob-2"));
        assert!(!mat.ready, "last file removed");
    }

    #[test]
    fn test_ready_survives_removal_with_legacy_file() {
        let mut mat = Material::new("Old evidence", MaterialCategory::Deliverable);
        mat.file_id = Some("legacy-1".to_string());
        mat.ready = true;
        mat.attach_file(AttachedFile::new("blob-1", "a.pdf", "application/pdf", 1));

        mat.remove_file("blob-1");
        assert!(mat.ready, "legacy reference still counts as attachment");

        mat.clear_legacy_file();
        assert!(!mat.ready);
    }

    #[test]
    fn test_explicit_toggle_for_reference_material() {
        let mut mat = Material::new("Statute excerpt", MaterialCategory::Reference);
        mat.set_ready(true);
        assert!(mat.ready);
        assert!(!mat.has_attachment());
    }

    #[test]
    fn test_blob_ids_cover_legacy_and_new() {
        let mut mat = Material::new("Bundle", MaterialCategory::Deliverable);
        mat.file_id = Some("legacy-1".to_string());
        mat.attach_file(AttachedFile::new("blob-1", "a.pdf", "application/pdf", 1));

        let ids: Vec<&str> = mat.blob_ids().collect();
        assert_eq!(ids, vec!["legacy-1", "blob-1"]);
    }

    #[test]
    fn test_category_defaults_to_deliverable() {
        let mat: Material = serde_json::from_str(r#"{"id":"m1","name":"x"}"#).unwrap();
        assert_eq!(mat.category, MaterialCategory::Deliverable);
        assert!(!mat.ready);
    }
}
