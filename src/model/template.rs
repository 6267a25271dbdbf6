//! Templates: reusable matter blueprints

use super::{new_id, Stage};
use crate::error::StorageError;
use serde::{Deserialize, Serialize};

/// A reusable blueprint of stages and tasks used to seed new matters.
///
/// Structurally a template's stages look exactly like a matter's, but every
/// task sits at the neutral `Pending` status and there are no instance-only
/// collections (no judgment log, no dismissed-attention set).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stages: Vec<Stage>,
}

impl Template {
    /// Create an empty template. An empty name is rejected before anything
    /// reaches a store.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, StorageError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(StorageError::Validation(
                "template name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id: new_id(),
            name,
            description: description.into(),
            stages: Vec::new(),
        })
    }

    /// Every blob id referenced by this template's materials.
    pub fn blob_ids(&self) -> impl Iterator<Item = &str> {
        self.stages
            .iter()
            .flat_map(|s| s.tasks.iter())
            .flat_map(|t| t.materials.iter())
            .flat_map(|m| m.blob_ids())
    }
}
