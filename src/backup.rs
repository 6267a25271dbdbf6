//! Backup/restore engine
//!
//! Export packs both metadata collections and every referenced blob into one
//! zip archive; import performs the inverse, restoring blobs before the
//! metadata commit so that file references are already resolvable the moment
//! the collections become visible. Import is destructive by design: the
//! archive's collections wholesale-replace the current ones, no merge.
//!
//! Archive layout:
//!
//! ```text
//! backup.zip
//! ├── backup.json        # { version, date, matters, templates }
//! └── files/
//!     ├── <blob id>      # one entry per unique referenced blob, no extension
//!     └── ...
//! ```
//!
//! Entries outside `files/` (other than the manifest) are ignored on import.

use crate::blob_store::BlobStore;
use crate::error::StorageError;
use crate::metadata_store::MetadataStore;
use crate::model::{Matter, Template};
use chrono::{DateTime, Utc};
use futures_util::future::{join_all, try_join_all};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Current archive format version.
pub const ARCHIVE_VERSION: u32 = 1;

/// Name of the structured-document entry inside the archive.
pub const MANIFEST_ENTRY: &str = "backup.json";

/// Directory prefix for blob entries inside the archive.
pub const FILES_PREFIX: &str = "files/";

/// The structured document at the heart of the archive.
#[derive(Debug, Serialize, Deserialize)]
pub struct BackupManifest {
    pub version: u32,
    pub date: DateTime<Utc>,
    pub matters: Vec<Matter>,
    pub templates: Vec<Template>,
}

/// What an export produced.
#[derive(Debug, Clone, Copy)]
pub struct ExportSummary {
    pub matters: usize,
    pub templates: usize,
    pub files: usize,
}

/// What an import restored.
#[derive(Debug, Clone, Copy)]
pub struct ImportSummary {
    pub matters: usize,
    pub templates: usize,
    pub files: usize,
}

/// The deduplicated set of blob ids referenced anywhere in either
/// collection (legacy single-file references included).
pub fn referenced_blob_ids(matters: &[Matter], templates: &[Template]) -> BTreeSet<String> {
    let mut ids = BTreeSet::new();
    for matter in matters {
        ids.extend(matter.blob_ids().map(str::to_string));
    }
    for template in templates {
        ids.extend(template.blob_ids().map(str::to_string));
    }
    ids
}

/// Export both collections and their referenced blobs as archive bytes.
///
/// Blob reads fan out concurrently; ids whose blob is missing are skipped
/// (export is best-effort), while a read fault aborts the whole export.
/// Nothing is written to either store.
pub async fn export_archive(
    metadata: &MetadataStore,
    blobs: &BlobStore,
) -> Result<(Vec<u8>, ExportSummary), StorageError> {
    let matters = metadata.load_matters().await?;
    let templates = metadata.load_templates().await?;

    let ids: Vec<String> = referenced_blob_ids(&matters, &templates)
        .into_iter()
        .collect();
    let fetches = ids.iter().map(|id| async move { (id, blobs.get(id).await) });

    let mut entries: Vec<(&String, Vec<u8>)> = Vec::new();
    for (id, result) in join_all(fetches).await {
        match result? {
            Some(data) => entries.push((id, data)),
            None => debug!(id = %id, "Referenced blob missing, skipped from export"),
        }
    }

    let manifest = BackupManifest {
        version: ARCHIVE_VERSION,
        date: Utc::now(),
        matters,
        templates,
    };

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    writer.start_file(MANIFEST_ENTRY, options)?;
    writer.write_all(&serde_json::to_vec_pretty(&manifest)?)?;

    let summary = ExportSummary {
        matters: manifest.matters.len(),
        templates: manifest.templates.len(),
        files: entries.len(),
    };

    for (id, data) in entries {
        writer.start_file(format!("{FILES_PREFIX}{id}"), options)?;
        writer.write_all(&data)?;
    }

    let bytes = writer.finish()?.into_inner();
    info!(
        matters = summary.matters,
        templates = summary.templates,
        files = summary.files,
        size = bytes.len(),
        "Exported backup archive"
    );
    Ok((bytes, summary))
}

/// Export straight to a file on disk.
pub async fn export_to_file<P: AsRef<Path>>(
    metadata: &MetadataStore,
    blobs: &BlobStore,
    path: P,
) -> Result<ExportSummary, StorageError> {
    let (bytes, summary) = export_archive(metadata, blobs).await?;
    tokio::fs::write(path.as_ref(), &bytes).await?;
    Ok(summary)
}

/// Import an archive, replacing the metadata store's collections.
///
/// All blob entries are written to the blob store first, fanned out and
/// joined; only after every write succeeds are the collections committed.
/// A failure before that final commit leaves the metadata store untouched
/// (blobs already written stay behind as tolerated orphans).
pub async fn import_archive(
    metadata: &MetadataStore,
    blobs: &BlobStore,
    bytes: &[u8],
) -> Result<ImportSummary, StorageError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let manifest: BackupManifest = {
        let mut entry = match archive.by_name(MANIFEST_ENTRY) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(StorageError::Format(format!(
                    "archive has no {MANIFEST_ENTRY} entry"
                )))
            }
            Err(e) => return Err(e.into()),
        };
        let mut raw = String::new();
        entry.read_to_string(&mut raw)?;
        serde_json::from_str(&raw)
            .map_err(|e| StorageError::Format(format!("malformed {MANIFEST_ENTRY}: {e}")))?
    };

    if manifest.version != ARCHIVE_VERSION {
        return Err(StorageError::Format(format!(
            "unsupported archive version {} (expected {ARCHIVE_VERSION})",
            manifest.version
        )));
    }

    // Collect blob entries. Anything outside files/ is ignored; entry names
    // that are not plausible blob ids are skipped rather than trusted as
    // file system paths.
    let mut blob_entries: Vec<(String, Vec<u8>)> = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if !entry.is_file() {
            continue;
        }
        let name = entry.name().to_string();
        let Some(id) = name.strip_prefix(FILES_PREFIX) else {
            continue;
        };
        if !BlobStore::is_valid_id(id) {
            warn!(entry = %name, "Skipping archive entry with unusable blob id");
            continue;
        }
        let mut data = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut data)?;
        blob_entries.push((id.to_string(), data));
    }

    // Blobs first: every write must land before the metadata commit, so the
    // restored collections never reference bytes that are not there yet.
    try_join_all(
        blob_entries
            .iter()
            .map(|(id, data)| blobs.put(id, data)),
    )
    .await?;

    let summary = ImportSummary {
        matters: manifest.matters.len(),
        templates: manifest.templates.len(),
        files: blob_entries.len(),
    };

    metadata.save_matters(&manifest.matters).await?;
    metadata.save_templates(&manifest.templates).await?;

    info!(
        matters = summary.matters,
        templates = summary.templates,
        files = summary.files,
        "Imported backup archive"
    );
    Ok(summary)
}

/// Import an archive file from disk.
pub async fn import_from_file<P: AsRef<Path>>(
    metadata: &MetadataStore,
    blobs: &BlobStore,
    path: P,
) -> Result<ImportSummary, StorageError> {
    let bytes = tokio::fs::read(path.as_ref()).await?;
    import_archive(metadata, blobs, &bytes).await
}

/// Maintenance sweep: delete every stored blob not referenced by either
/// collection. Deleting a matter or material never deletes blobs on the hot
/// path; this is where the orphans get reclaimed.
pub async fn sweep_orphan_blobs(
    metadata: &MetadataStore,
    blobs: &BlobStore,
) -> Result<usize, StorageError> {
    let matters = metadata.load_matters().await?;
    let templates = metadata.load_templates().await?;
    let referenced = referenced_blob_ids(&matters, &templates);

    let mut removed = 0;
    for id in blobs.list_ids().await? {
        if !referenced.contains(&id) {
            blobs.delete(&id).await?;
            removed += 1;
        }
    }

    info!(removed, "Swept orphaned blobs");
    Ok(removed)
}
