//! Text-analysis collaborator seam
//!
//! AI-assisted summarization and template drafting live outside this crate,
//! behind an opaque request/response boundary. The contract: an empty result
//! is `Ok(None)`, never an error, so a collaborator that comes back with
//! nothing can never corrupt local state. Only transport faults are errors.

use crate::error::StorageError;
use crate::model::{Stage, Task, Template};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A structured summary returned for a matter/template excerpt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatterDigest {
    pub headline: String,
    #[serde(default)]
    pub details: Vec<String>,
}

/// A template skeleton derived from free text: stage and task titles only,
/// no statuses, materials, or dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSkeleton {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stages: Vec<SkeletonStage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkeletonStage {
    pub title: String,
    #[serde(default)]
    pub tasks: Vec<String>,
}

impl TemplateSkeleton {
    /// Flesh the skeleton out into a blank template with pending tasks.
    pub fn into_template(self) -> Result<Template, StorageError> {
        let mut template = Template::new(self.name, self.description)?;
        template.stages = self
            .stages
            .into_iter()
            .map(|stage| {
                let mut built = Stage::new(stage.title);
                built.tasks = stage.tasks.into_iter().map(Task::new).collect();
                built
            })
            .collect();
        Ok(template)
    }
}

/// The analysis collaborator consumed by the application layer.
#[async_trait]
pub trait TextAnalysis: Send + Sync {
    /// Summarize a serialized matter/template excerpt plus free text.
    async fn summarize(&self, excerpt: &str) -> Result<Option<MatterDigest>, StorageError>;

    /// Derive a template skeleton from free text.
    async fn derive_skeleton(
        &self,
        text: &str,
    ) -> Result<Option<TemplateSkeleton>, StorageError>;
}
