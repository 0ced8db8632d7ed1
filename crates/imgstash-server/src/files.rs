//! Static serving of stored images
//!
//! Serves blob bytes straight from the storage directory. The filename is a
//! caller-supplied URL parameter, so it goes through the repository's
//! sanitized resolution before any filesystem access.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use imgstash_core::problemdetails::{Problem, ProblemDetails};
use imgstash_storage::StorageError;
use tokio::fs;
use tracing::debug;

use crate::types::AppState;

/// Serve a stored image's bytes
#[utoipa::path(
    tag = "Files",
    get,
    path = "/uploads/{filename}",
    params(
        ("filename" = String, Path, description = "Stored filename to serve")
    ),
    responses(
        (status = 200, description = "Image bytes", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid filename", body = ProblemDetails),
        (status = 404, description = "File not found", body = ProblemDetails),
        (status = 500, description = "Storage I/O failure", body = ProblemDetails)
    )
)]
pub async fn serve_upload(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, Problem> {
    let path = state.repository.resolve(&filename)?;

    debug!("GET /uploads/{}", filename);

    let content = match fs::read(&path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StorageError::NotFound(filename).into());
        }
        Err(e) => return Err(StorageError::Io(e).into()),
    };

    let content_type = infer_content_type(&filename);
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type)],
        content,
    ))
}

fn infer_content_type(filename: &str) -> &'static str {
    let extension = std::path::Path::new(filename)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("");

    match extension.to_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
