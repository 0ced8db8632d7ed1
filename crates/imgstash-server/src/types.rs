//! Request and response types for the image HTTP handlers

use serde::Serialize;
use utoipa::ToSchema;

use imgstash_core::ServerConfig;
use imgstash_storage::engine::StoredBlob;
use imgstash_storage::repository::{url_for, BlobRef};
use imgstash_storage::{BlobRepository, IngestEngine};

/// Application state for image handlers
pub struct AppState {
    pub engine: IngestEngine,
    pub repository: BlobRepository,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let engine = IngestEngine::new(
            &config.upload_dir,
            imgstash_storage::UploadPolicy::default(),
            config.max_file_size,
        );
        let repository = BlobRepository::new(&config.upload_dir);
        Self {
            engine,
            repository,
            config,
        }
    }
}

/// A stored image reference as surfaced to clients
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageRefResponse {
    /// On-disk filename; clients keep this for later delete calls
    #[schema(example = "image-1735916400000-123456789.png")]
    pub filename: String,
    /// Public URL of the image
    #[schema(example = "http://localhost:3000/uploads/image-1735916400000-123456789.png")]
    pub url: String,
}

impl ImageRefResponse {
    pub fn from_blob(blob: &StoredBlob, base_url: &str) -> Self {
        Self {
            filename: blob.filename.clone(),
            url: url_for(base_url, &blob.filename),
        }
    }

    pub fn from_ref(blob: &BlobRef, base_url: &str) -> Self {
        Self {
            filename: blob.filename.clone(),
            url: url_for(base_url, &blob.filename),
        }
    }
}

/// Response after a single-file upload
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Human-readable confirmation
    #[schema(example = "File uploaded successfully!")]
    pub message: String,
    /// On-disk filename; clients keep this for later delete calls
    #[schema(example = "image-1735916400000-123456789.png")]
    pub filename: String,
    /// Public URL of the image
    #[schema(example = "http://localhost:3000/uploads/image-1735916400000-123456789.png")]
    pub url: String,
    /// Size in bytes as written
    #[schema(example = 512000)]
    pub size: u64,
}

/// Response after a multi-field gallery upload.
///
/// Partial success is expected: rejected files are simply omitted, so the
/// response states exactly which files were stored.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GalleryUploadResponse {
    /// The stored primary image, if one was accepted
    pub main_image: Option<ImageRefResponse>,
    /// The accepted secondary images
    pub sub_images: Vec<ImageRefResponse>,
}

/// Response for listing stored images
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListImagesResponse {
    pub images: Vec<ImageRefResponse>,
}

/// Response after deleting an image
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteImageResponse {
    #[schema(example = "File image-1735916400000-123456789.png deleted successfully.")]
    pub message: String,
}
