//! Matter Storage - local-first persistence for matter tracking
//!
//! Tracks "matters" (legal/administrative case files) built from ordered
//! stages and tasks, with attached materials and a reusable template system.
//! This crate is the persistence and transformation core; rendering, AI text
//! analysis, and notification delivery are external collaborators consuming
//! the interfaces exported here.
//!
//! ## Architecture
//!
//! - **Document model** ([`model`]): the Matter/Template entity graph and
//!   its invariants. Pure data, no I/O.
//! - **Metadata store** ([`metadata_store`]): whole-collection JSON
//!   persistence, one document per collection.
//! - **Blob store** ([`blob_store`]): id-keyed binary storage for uploaded
//!   files, independent of the metadata.
//! - **Transformer** ([`transformer`]): template ⇄ matter conversion and
//!   in-place template edit sessions.
//! - **Backup engine** ([`backup`]): zip export/import across both stores,
//!   plus the orphan-blob sweep.
//!
//! ## Storage Layout
//!
//! ```text
//! ~/.local/share/matter-storage/
//! ├── matters.json           # Matter collection, replaced whole on save
//! ├── templates.json         # Template collection, replaced whole on save
//! ├── blobs/                 # Uploaded file bytes, keyed by opaque id
//! │   └── ab/ab12cd34-...
//! └── config.toml            # Configuration
//! ```

pub mod analysis;
pub mod attention;
pub mod backup;
pub mod blob_store;
pub mod config;
pub mod error;
pub mod metadata_store;
pub mod model;
pub mod transformer;

// Re-exports
pub use analysis::{MatterDigest, TemplateSkeleton, TextAnalysis};
pub use attention::{scan as attention_scan, AttentionItem, OVERDUE_SENTINEL};
pub use backup::{
    export_archive, export_to_file, import_archive, import_from_file, sweep_orphan_blobs,
    BackupManifest, ExportSummary, ImportSummary, ARCHIVE_VERSION,
};
pub use blob_store::{BlobStats, BlobStore};
pub use config::Config;
pub use error::StorageError;
pub use metadata_store::MetadataStore;
pub use model::{
    AttachedFile, JudgmentRecord, Material, MaterialCategory, Matter, Stage, StatusUpdate, Task,
    TaskStatus, Template,
};
pub use transformer::{dematerialize, is_temporary_matter, materialize, TemplateEditor};
