//! Local filesystem blob store.
//!
//! Blobs live at `{root}/{bucket}/{key}`. Each put writes a hidden temporary
//! file next to the target and renames it into place, so readers never see a
//! partially written batch.

use std::path::{Path, PathBuf};

use inbrief_core::storage::BlobStore;
use inbrief_types::error::BlobStoreError;

pub struct LocalBlobStore {
    dir: PathBuf,
}

impl LocalBlobStore {
    /// A store writing into `{root}/{bucket}/`.
    pub fn new(root: impl AsRef<Path>, bucket: &str) -> Self {
        Self {
            dir: root.as_ref().join(bucket),
        }
    }

    /// Directory holding the blobs.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the blob stored under `key`.
    pub fn path(&self, key: &str) -> Result<PathBuf, BlobStoreError> {
        validate_key(key)?;
        Ok(self.dir.join(key))
    }
}

/// Keys are single path components that are neither hidden nor relative.
fn validate_key(key: &str) -> Result<(), BlobStoreError> {
    let invalid = key.is_empty()
        || key.starts_with('.')
        || key.contains(['/', '\\', '\0']);
    if invalid {
        return Err(BlobStoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

fn io_error(path: &Path, err: std::io::Error) -> BlobStoreError {
    BlobStoreError::Io(format!("{}: {err}", path.display()))
}

impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), BlobStoreError> {
        let path = self.path(key)?;
        let tmp = self.dir.join(format!(".{key}.tmp"));

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(&self.dir, e))?;
        tokio::fs::write(&tmp, &body)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        if let Err(err) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_error(&path, err));
        }

        tracing::debug!(path = %path.display(), bytes = body.len(), "blob written");
        Ok(())
    }
}
