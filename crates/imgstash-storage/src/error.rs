//! Error types for the storage core

use axum::http::StatusCode;
use imgstash_core::problemdetails::{self, Problem};
use thiserror::Error;

/// Errors that can occur while ingesting, enumerating or deleting blobs
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("unsupported upload type: extension '{extension}', content type '{content_type}'")]
    UnsupportedType {
        extension: String,
        content_type: String,
    },

    #[error("file exceeds the upload limit of {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("no file provided in field '{field}'")]
    NoFileProvided { field: String },

    #[error("blob not found: {0}")]
    NotFound(String),

    #[error("invalid filename: {0}")]
    InvalidFilename(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for Problem {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::UnsupportedType {
                extension,
                content_type,
            } => problemdetails::new(StatusCode::UNSUPPORTED_MEDIA_TYPE)
                .with_title("Unsupported Media Type")
                .with_detail(format!(
                    "File uploads only support jpeg, jpg and png (got extension '{}', content type '{}')",
                    extension, content_type
                )),

            StorageError::TooLarge { limit } => problemdetails::new(StatusCode::PAYLOAD_TOO_LARGE)
                .with_title("File Too Large")
                .with_detail(format!("Uploads are limited to {} bytes", limit)),

            StorageError::NoFileProvided { field } => problemdetails::new(StatusCode::BAD_REQUEST)
                .with_title("No File Provided")
                .with_detail(format!(
                    "No file was uploaded in field '{}'. Please select a JPG or PNG file.",
                    field
                )),

            StorageError::NotFound(filename) => problemdetails::new(StatusCode::NOT_FOUND)
                .with_title("Image Not Found")
                .with_detail(format!("Image '{}' does not exist", filename)),

            StorageError::InvalidFilename(filename) => {
                problemdetails::new(StatusCode::BAD_REQUEST)
                    .with_title("Invalid Filename")
                    .with_detail(format!("Invalid image filename: {}", filename))
            }

            StorageError::Io(e) => problemdetails::new(StatusCode::INTERNAL_SERVER_ERROR)
                .with_title("Storage Error")
                .with_detail(e.to_string()),
        }
    }
}
