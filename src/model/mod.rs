//! Document model for matters and templates
//!
//! The entity graph is strictly hierarchical: a Matter (or Template) owns its
//! Stages, a Stage owns its Tasks, a Task owns its Materials and
//! StatusUpdates, a Material owns its AttachedFiles. No entity is shared
//! between two parents. All operations here are pure data manipulation; the
//! stores do the I/O.
//!
//! The only link out of the graph is `AttachedFile::id`, which doubles as the
//! blob store key for the file's bytes.

mod material;
mod matter;
mod task;
mod template;

pub use material::{AttachedFile, Material, MaterialCategory};
pub use matter::{JudgmentRecord, Matter, Stage};
pub use task::{StatusUpdate, Task, TaskStatus};
pub use template::Template;

use uuid::Uuid;

/// Generate a fresh entity identifier.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
