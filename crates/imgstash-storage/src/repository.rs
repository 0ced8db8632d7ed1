//! Blob repository: enumerate, locate and delete stored blobs
//!
//! Every operation reads the storage directory fresh. The directory is the
//! only record: there is no index to go stale, and a file's existence is the
//! entire fact of the blob. Listing re-filters by extension so a disallowed
//! file placed in the directory out-of-band is silently excluded rather
//! than erroring.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::policy;

/// Reference to a stored blob, identified solely by its filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobRef {
    pub filename: String,
}

/// Build the public URL for a stored filename under a base URL.
pub fn url_for(base_url: &str, filename: &str) -> String {
    format!("{}/uploads/{}", base_url.trim_end_matches('/'), filename)
}

/// Directory-scan repository over a single flat storage directory
#[derive(Debug, Clone)]
pub struct BlobRepository {
    root: PathBuf,
}

impl BlobRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Enumerate stored blobs whose extension is in the read allow-list.
    /// Order is filesystem enumeration order, not stable across calls.
    pub async fn list(&self) -> StorageResult<Vec<BlobRef>> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut blobs = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let Ok(filename) = entry.file_name().into_string() else {
                continue;
            };
            if policy::is_listed(&filename) {
                blobs.push(BlobRef { filename });
            }
        }

        debug!("LIST {} -> {} blobs", self.root.display(), blobs.len());
        Ok(blobs)
    }

    /// Exact, case-sensitive filename match over `list()`.
    pub async fn search(&self, filename: &str) -> StorageResult<Option<BlobRef>> {
        let found = self
            .list()
            .await?
            .into_iter()
            .find(|blob| blob.filename == filename);
        Ok(found)
    }

    /// Remove a stored blob. The filename comes from a caller-supplied URL
    /// parameter, so it is sanitized before it is joined to the storage
    /// root; traversal sequences never reach the filesystem.
    pub async fn delete(&self, filename: &str) -> StorageResult<()> {
        let filename = sanitize(filename)?;
        let path = self.root.join(filename);

        debug!("DELETE {}", path.display());

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(filename.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve a caller-supplied filename to its path under the storage
    /// root, rejecting traversal. Used by the static file handler.
    pub fn resolve(&self, filename: &str) -> StorageResult<PathBuf> {
        let filename = sanitize(filename)?;
        Ok(self.root.join(filename))
    }
}

/// Reject empty names, path separators and parent-directory components.
fn sanitize(filename: &str) -> StorageResult<&str> {
    if filename.is_empty()
        || filename == "."
        || filename.contains("..")
        || filename.contains('/')
        || filename.contains('\\')
    {
        return Err(StorageError::InvalidFilename(filename.to_string()));
    }
    Ok(filename)
}
