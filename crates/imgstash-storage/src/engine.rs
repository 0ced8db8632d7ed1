//! Ingestion engine: validate, name, persist
//!
//! Streams an incoming file to disk under a policy-derived name. Validation
//! happens before the first byte is written; the size ceiling is enforced
//! while streaming; any failure or caller abort removes the partial file,
//! so a rejected upload is a no-op on the filesystem.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::policy::UploadPolicy;

/// A successfully persisted blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// On-disk filename, unique within the storage directory
    pub filename: String,
    /// Size in bytes as written
    pub size: u64,
}

/// Validate-then-persist pipeline for uploaded files
#[derive(Debug, Clone)]
pub struct IngestEngine {
    root: PathBuf,
    policy: UploadPolicy,
    max_file_size: u64,
}

impl IngestEngine {
    pub fn new(root: impl Into<PathBuf>, policy: UploadPolicy, max_file_size: u64) -> Self {
        Self {
            root: root.into(),
            policy,
            max_file_size,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ingest one uploaded file.
    ///
    /// The extension of `original_filename` and `content_type` must both
    /// pass the policy before anything touches the disk. The stream is then
    /// written to `{root}/{generated name}`, counting bytes against the
    /// ceiling. On any error, and if the caller drops the future mid-stream,
    /// the partially written file is removed.
    pub async fn ingest<S>(
        &self,
        field_name: &str,
        original_filename: &str,
        content_type: &str,
        mut stream: S,
    ) -> StorageResult<StoredBlob>
    where
        S: Stream<Item = std::io::Result<Bytes>> + Unpin,
    {
        let extension = UploadPolicy::extension_of(original_filename).unwrap_or_default();
        if !self.policy.is_accepted(&extension, content_type) {
            return Err(StorageError::UnsupportedType {
                extension,
                content_type: content_type.to_string(),
            });
        }

        let filename = self.policy.name_for(field_name, &extension);
        let path = self.root.join(&filename);

        // Guard declared before the file handle so it drops after it,
        // removing the partial file on error or caller abort.
        let mut guard = PartialFileGuard::new(path.clone());
        let mut file = fs::File::create(&path).await?;
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            written += chunk.len() as u64;
            if written > self.max_file_size {
                return Err(StorageError::TooLarge {
                    limit: self.max_file_size,
                });
            }
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        drop(file);
        guard.disarm();

        debug!("PUT {} ({} bytes)", filename, written);

        Ok(StoredBlob {
            filename,
            size: written,
        })
    }
}

/// Removes the file at `path` on drop unless disarmed.
struct PartialFileGuard {
    path: PathBuf,
    armed: bool,
}

impl PartialFileGuard {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PartialFileGuard {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = std::fs::remove_file(&self.path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    debug!("Failed to remove partial file {}: {}", self.path.display(), e);
                }
            }
        }
    }
}
