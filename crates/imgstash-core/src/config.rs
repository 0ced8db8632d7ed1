//! Server configuration
//!
//! Resolves the listen address, the upload directory and the upload limits
//! from CLI flags and environment variables, and makes sure the upload
//! directory exists before the server starts accepting requests.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

/// Directory name used when no explicit upload directory is configured.
pub const UPLOAD_DIR_NAME: &str = "uploads";

/// Maximum accepted upload size in bytes (2.5 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 2_621_440;

/// Maximum number of files accepted in the secondary upload slot.
pub const DEFAULT_MAX_SECONDARY_FILES: usize = 10;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Address the HTTP server binds to, e.g. "0.0.0.0:3000"
    pub address: String,

    /// Directory blobs are written to and read from
    pub upload_dir: PathBuf,

    /// Per-file upload ceiling in bytes
    pub max_file_size: u64,

    /// Cap on files in the secondary multi-upload slot
    pub max_secondary_files: usize,

    /// Static base URL override; when unset, URLs are derived from the
    /// inbound request's Host header
    pub base_url: Option<String>,
}

impl ServerConfig {
    /// Build a configuration, creating the upload directory if needed.
    pub fn new(
        address: String,
        upload_dir: Option<PathBuf>,
        base_url: Option<String>,
    ) -> anyhow::Result<Self> {
        // Explicit flag wins, then the env var, then ./uploads
        let upload_dir = upload_dir
            .or_else(|| std::env::var("IMGSTASH_UPLOAD_DIR").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(UPLOAD_DIR_NAME));

        if !upload_dir.exists() {
            fs::create_dir_all(&upload_dir)?;
            info!("Created upload directory at: {}", upload_dir.display());
        }

        Ok(Self {
            address,
            upload_dir,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_secondary_files: DEFAULT_MAX_SECONDARY_FILES,
            base_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_missing_upload_dir() {
        let tmp = std::env::temp_dir().join(format!("imgstash-config-{}", std::process::id()));
        let _ = fs::remove_dir_all(&tmp);

        let config = ServerConfig::new(
            "127.0.0.1:0".to_string(),
            Some(tmp.clone()),
            None,
        )
        .unwrap();

        assert!(config.upload_dir.is_dir());
        assert_eq!(config.max_file_size, DEFAULT_MAX_FILE_SIZE);

        fs::remove_dir_all(&tmp).unwrap();
    }
}
