//! Whole-collection JSON persistence for matters and templates
//!
//! Two independent documents live under the data directory: `matters.json`
//! and `templates.json`. Each is read and replaced as a whole; there is no
//! partial-write path. The dataset is small and single-user, so whole-document
//! replacement beats incremental diffing at the cost of O(collection) writes.
//!
//! A first-ever load seeds the collection (one demo matter, a fixed set of
//! built-in templates) and persists the seed, so repeated loads return
//! identical content.

use crate::error::StorageError;
use crate::model::{Material, MaterialCategory, Matter, Stage, Task, Template};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Metadata store rooted at a data directory.
pub struct MetadataStore {
    matters_path: PathBuf,
    templates_path: PathBuf,
}

impl MetadataStore {
    /// Open a store under the given data directory, creating it if needed.
    pub async fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, StorageError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir).await?;

        info!(path = %data_dir.display(), "Opened metadata store");

        Ok(Self {
            matters_path: data_dir.join("matters.json"),
            templates_path: data_dir.join("templates.json"),
        })
    }

    /// Load the matter collection, seeding a demo matter on first use.
    pub async fn load_matters(&self) -> Result<Vec<Matter>, StorageError> {
        match fs::read(&self.matters_path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let seed = demo_matters();
                info!(count = seed.len(), "Seeding matter collection");
                self.save_matters(&seed).await?;
                Ok(seed)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the matter collection in a single atomic write.
    pub async fn save_matters(&self, matters: &[Matter]) -> Result<(), StorageError> {
        self.write_document(&self.matters_path, matters).await?;
        debug!(count = matters.len(), "Saved matter collection");
        Ok(())
    }

    /// Load the template collection, seeding the built-in set on first use.
    pub async fn load_templates(&self) -> Result<Vec<Template>, StorageError> {
        match fs::read(&self.templates_path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let seed = builtin_templates();
                info!(count = seed.len(), "Seeding template collection");
                self.save_templates(&seed).await?;
                Ok(seed)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the template collection in a single atomic write.
    pub async fn save_templates(&self, templates: &[Template]) -> Result<(), StorageError> {
        self.write_document(&self.templates_path, templates).await?;
        debug!(count = templates.len(), "Saved template collection");
        Ok(())
    }

    /// Serialize and replace a whole document: write to a sibling temp file,
    /// then rename into place so readers never see a torn write.
    async fn write_document<T: serde::Serialize + ?Sized>(
        &self,
        path: &Path,
        value: &T,
    ) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(value)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &bytes).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }
}

/// The demo matter shown on first-ever use, so the board is not empty.
fn demo_matters() -> Vec<Matter> {
    let mut matter = Matter::new("Demo: Vendor agreement review", "contract")
        .expect("demo title is non-empty");
    matter.current_situation = Some("Sample matter - feel free to edit or delete.".to_string());

    let stage_id = matter.add_stage("Intake");
    let task_id = matter
        .add_task(&stage_id, "Collect counterparty details")
        .expect("stage just created");
    let mut material = Material::new("Company registry extract", MaterialCategory::Reference);
    material.set_ready(true);
    matter
        .add_material(&task_id, material)
        .expect("task just created");

    let review_id = matter.add_stage("Review");
    matter
        .add_task(&review_id, "Mark up draft agreement")
        .expect("stage just created");
    matter
        .add_task(&review_id, "Confirm signature authority")
        .expect("stage just created");

    vec![matter]
}

/// The built-in template set seeded on first-ever use.
fn builtin_templates() -> Vec<Template> {
    let mut contract = Template::new(
        "Contract review",
        "Standard two-party agreement review workflow",
    )
    .expect("builtin name is non-empty");
    {
        let mut intake = Stage::new("Intake");
        intake
            .tasks
            .push(Task::new("Collect counterparty details"));
        intake
            .tasks
            .push(Task::new("Run conflict check"));
        let mut review = Stage::new("Review");
        let mut markup = Task::new("Mark up draft agreement");
        markup
            .materials
            .push(Material::new("Draft agreement", MaterialCategory::Deliverable));
        review.tasks.push(markup);
        review
            .tasks
            .push(Task::new("Confirm signature authority"));
        let mut closing = Stage::new("Closing");
        closing
            .tasks
            .push(Task::new("Collect signatures"));
        closing.tasks.push(Task::new("File executed copy"));
        contract.stages = vec![intake, review, closing];
    }

    let mut dispute = Template::new(
        "Dispute response",
        "Initial response to an incoming claim or demand letter",
    )
    .expect("builtin name is non-empty");
    {
        let mut assess = Stage::new("Assessment");
        let mut gather = Task::new("Gather correspondence");
        gather
            .materials
            .push(Material::new("Demand letter", MaterialCategory::Reference));
        assess.tasks.push(gather);
        assess
            .tasks
            .push(Task::new("Assess merits and exposure"));
        let mut respond = Stage::new("Response");
        respond
            .tasks
            .push(Task::new("Draft response letter"));
        respond
            .tasks
            .push(Task::new("Send response and calendar deadline"));
        dispute.stages = vec![assess, respond];
    }

    vec![contract, dispute]
}
