//! Id-keyed blob storage for uploaded files
//!
//! Stores file bytes in a local directory keyed by an opaque identifier
//! generated at upload time. Ids are deliberately not content hashes: two
//! uploads of identical bytes stay distinct, matching the one-owner model of
//! attached files. The store knows nothing about matters or templates;
//! referential integrity is the caller's concern.

use crate::error::StorageError;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

/// Blob storage manager
pub struct BlobStore {
    /// Root directory for blob storage
    root_dir: PathBuf,
}

impl BlobStore {
    /// Create a new blob store at the given directory
    pub async fn open<P: AsRef<Path>>(root_dir: P) -> Result<Self, StorageError> {
        let root_dir = root_dir.as_ref().to_path_buf();

        // Ensure directory exists
        fs::create_dir_all(&root_dir).await?;

        info!(path = %root_dir.display(), "Initialized blob store");

        Ok(Self { root_dir })
    }

    /// Generate a fresh blob id for an upload.
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Whether a string is usable as a blob id (and safe as a file name).
    pub fn is_valid_id(id: &str) -> bool {
        !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    /// Get path for a blob by id
    fn blob_path(&self, id: &str) -> PathBuf {
        // First 2 chars of the id as subdirectory for filesystem distribution
        let subdir = id.get(..2).unwrap_or("_");
        self.root_dir.join(subdir).join(id)
    }

    /// Store a blob under the given id, replacing any previous content.
    pub async fn put(&self, id: &str, data: &[u8]) -> Result<(), StorageError> {
        if !Self::is_valid_id(id) {
            return Err(StorageError::Validation(format!("invalid blob id: {id:?}")));
        }
        let blob_path = self.blob_path(id);

        if let Some(parent) = blob_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&blob_path, data).await?;

        debug!(id = %id, size = data.len(), "Stored blob");
        Ok(())
    }

    /// Retrieve a blob by id.
    ///
    /// A missing id is `Ok(None)`, never an error: callers surface it as
    /// "file missing or unreadable" and carry on.
    pub async fn get(&self, id: &str) -> Result<Option<Vec<u8>>, StorageError> {
        if !Self::is_valid_id(id) {
            return Ok(None);
        }
        match fs::read(self.blob_path(id)).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Check if a blob exists
    pub async fn exists(&self, id: &str) -> bool {
        Self::is_valid_id(id) && fs::metadata(self.blob_path(id)).await.is_ok()
    }

    /// Delete a blob. Deleting an id that was never stored is a no-op.
    pub async fn delete(&self, id: &str) -> Result<(), StorageError> {
        if !Self::is_valid_id(id) {
            return Ok(());
        }
        match fs::remove_file(self.blob_path(id)).await {
            Ok(()) => {
                debug!(id = %id, "Deleted blob");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// List every stored blob id (for stats and the GC sweep).
    pub async fn list_ids(&self) -> Result<Vec<String>, StorageError> {
        let mut ids = Vec::new();
        let mut entries = match fs::read_dir(&self.root_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ids),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            if !entry.path().is_dir() {
                continue;
            }
            let mut subentries = fs::read_dir(entry.path()).await?;
            while let Some(subentry) = subentries.next_entry().await? {
                if let Some(name) = subentry.file_name().to_str() {
                    ids.push(name.to_string());
                }
            }
        }

        ids.sort();
        Ok(ids)
    }

    /// Get storage statistics
    pub async fn stats(&self) -> Result<BlobStats, StorageError> {
        let mut total_blobs = 0u64;
        let mut total_bytes = 0u64;

        for id in self.list_ids().await? {
            if let Ok(metadata) = fs::metadata(self.blob_path(&id)).await {
                total_blobs += 1;
                total_bytes += metadata.len();
            }
        }

        Ok(BlobStats {
            total_blobs,
            total_bytes,
        })
    }
}

/// Storage statistics
#[derive(Debug, Clone)]
pub struct BlobStats {
    pub total_blobs: u64,
    pub total_bytes: u64,
}
