//! HTTP handlers for image upload, listing, search and deletion

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use futures::TryStreamExt;
use imgstash_core::problemdetails::{self, Problem, ProblemDetails};
use imgstash_core::ServerConfig;
use imgstash_storage::repository::url_for;
use imgstash_storage::StorageError;
use tracing::{debug, info};
use utoipa::OpenApi;

use crate::files;
use crate::types::*;

/// Field name of the single-upload slot
pub const SINGLE_FIELD: &str = "image";
/// Field name of the gallery primary slot (at most one file)
pub const PRIMARY_FIELD: &str = "main_image";
/// Field name of the gallery secondary slot (capped per request)
pub const SECONDARY_FIELD: &str = "sub_images";

/// Request body cap for multipart uploads. Above the per-file ceiling;
/// per-file enforcement happens in the ingest engine.
const MAX_REQUEST_BODY_BYTES: usize = 32 * 1024 * 1024;

/// OpenAPI documentation for the image API
#[derive(OpenApi)]
#[openapi(
    paths(
        upload_image,
        upload_gallery,
        list_images,
        get_image,
        delete_image,
        files::serve_upload,
    ),
    components(
        schemas(
            UploadResponse,
            GalleryUploadResponse,
            ImageRefResponse,
            ListImagesResponse,
            DeleteImageResponse,
            ProblemDetails,
        )
    ),
    tags(
        (name = "Images", description = "Image upload, listing and deletion"),
        (name = "Files", description = "Static serving of stored images")
    )
)]
pub struct ImagesApiDoc;

/// Configure image routes
pub fn configure_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/upload", post(upload_image))
        .route("/upload/gallery", post(upload_gallery))
        .route("/images", get(list_images))
        .route("/images/{filename}", get(get_image).delete(delete_image))
        .route("/uploads/{filename}", get(files::serve_upload))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .with_state(state)
}

/// Public base URL for this request: static override if configured, else
/// derived from the inbound scheme and Host header.
fn base_url(config: &ServerConfig, headers: &HeaderMap) -> String {
    if let Some(base) = &config.base_url {
        return base.clone();
    }

    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");

    format!("{}://{}", scheme, host)
}

fn multipart_problem(e: axum::extract::multipart::MultipartError) -> Problem {
    problemdetails::new(StatusCode::BAD_REQUEST)
        .with_title("Invalid Multipart Body")
        .with_detail(e.to_string())
}

/// Upload a single image
///
/// Accepts one file in the `image` multipart field. The file's extension
/// and declared content type must both be jpeg/jpg/png and the file must be
/// at most 2.5 MiB.
#[utoipa::path(
    tag = "Images",
    post,
    path = "/upload",
    request_body(content = String, content_type = "multipart/form-data", description = "Multipart body with an `image` file field"),
    responses(
        (status = 201, description = "Image stored", body = UploadResponse),
        (status = 400, description = "No file provided or malformed body", body = ProblemDetails),
        (status = 413, description = "File exceeds the size ceiling", body = ProblemDetails),
        (status = 415, description = "Extension or content type not allowed", body = ProblemDetails),
        (status = 500, description = "Storage I/O failure", body = ProblemDetails)
    )
)]
async fn upload_image(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, Problem> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_problem)? {
        if field.name() != Some(SINGLE_FIELD) {
            debug!("Skipping unexpected multipart field: {:?}", field.name());
            continue;
        }

        let original = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();

        let stream = Box::pin(
            field.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e)),
        );
        let stored = state
            .engine
            .ingest(SINGLE_FIELD, &original, &content_type, stream)
            .await?;

        info!("Uploaded {} ({} bytes)", stored.filename, stored.size);

        let base = base_url(&state.config, &headers);
        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                message: "File uploaded successfully!".to_string(),
                url: url_for(&base, &stored.filename),
                filename: stored.filename,
                size: stored.size,
            }),
        ));
    }

    Err(StorageError::NoFileProvided {
        field: SINGLE_FIELD.to_string(),
    }
    .into())
}

/// Upload a gallery: one primary image and up to ten secondary images
///
/// Partial success is supported: each file is validated independently,
/// rejected files are omitted from the response, and the response states
/// exactly which files were stored.
#[utoipa::path(
    tag = "Images",
    post,
    path = "/upload/gallery",
    request_body(content = String, content_type = "multipart/form-data", description = "Multipart body with `main_image` (max 1) and `sub_images` (max 10) file fields"),
    responses(
        (status = 201, description = "Accepted files stored", body = GalleryUploadResponse),
        (status = 400, description = "No file in either slot or malformed body", body = ProblemDetails),
        (status = 500, description = "Storage I/O failure", body = ProblemDetails)
    )
)]
async fn upload_gallery(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, Problem> {
    let base = base_url(&state.config, &headers);
    let mut main_image: Option<ImageRefResponse> = None;
    let mut sub_images: Vec<ImageRefResponse> = Vec::new();
    let mut saw_file = false;

    while let Some(field) = multipart.next_field().await.map_err(multipart_problem)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        let slot_open = match name.as_str() {
            PRIMARY_FIELD => main_image.is_none(),
            SECONDARY_FIELD => sub_images.len() < state.config.max_secondary_files,
            _ => {
                debug!("Skipping unexpected multipart field: {}", name);
                continue;
            }
        };
        if !slot_open {
            debug!("Slot '{}' is full, skipping extra file", name);
            continue;
        }

        saw_file = true;
        let original = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();

        let stream = Box::pin(
            field.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e)),
        );
        match state
            .engine
            .ingest(&name, &original, &content_type, stream)
            .await
        {
            Ok(stored) => {
                info!("Uploaded {} into '{}' ({} bytes)", stored.filename, name, stored.size);
                let entry = ImageRefResponse::from_blob(&stored, &base);
                if name == PRIMARY_FIELD {
                    main_image = Some(entry);
                } else {
                    sub_images.push(entry);
                }
            }
            // Validation failures are omitted, not fatal: partial success
            Err(e @ (StorageError::UnsupportedType { .. } | StorageError::TooLarge { .. })) => {
                debug!("Rejected '{}' in slot '{}': {}", original, name, e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    if !saw_file {
        return Err(StorageError::NoFileProvided {
            field: PRIMARY_FIELD.to_string(),
        }
        .into());
    }

    Ok((
        StatusCode::CREATED,
        Json(GalleryUploadResponse {
            main_image,
            sub_images,
        }),
    ))
}

/// List stored images
#[utoipa::path(
    tag = "Images",
    get,
    path = "/images",
    responses(
        (status = 200, description = "Stored images with public URLs", body = ListImagesResponse),
        (status = 500, description = "Storage I/O failure", body = ProblemDetails)
    )
)]
async fn list_images(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, Problem> {
    let base = base_url(&state.config, &headers);
    let images = state
        .repository
        .list()
        .await?
        .iter()
        .map(|blob| ImageRefResponse::from_ref(blob, &base))
        .collect();

    Ok(Json(ListImagesResponse { images }))
}

/// Look up a stored image by exact filename
#[utoipa::path(
    tag = "Images",
    get,
    path = "/images/{filename}",
    params(
        ("filename" = String, Path, description = "Exact stored filename")
    ),
    responses(
        (status = 200, description = "Image found", body = ImageRefResponse),
        (status = 404, description = "No image with that filename", body = ProblemDetails),
        (status = 500, description = "Storage I/O failure", body = ProblemDetails)
    )
)]
async fn get_image(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, Problem> {
    let base = base_url(&state.config, &headers);
    match state.repository.search(&filename).await? {
        Some(blob) => Ok(Json(ImageRefResponse::from_ref(&blob, &base))),
        None => Err(StorageError::NotFound(filename).into()),
    }
}

/// Delete a stored image
#[utoipa::path(
    tag = "Images",
    delete,
    path = "/images/{filename}",
    params(
        ("filename" = String, Path, description = "Exact stored filename")
    ),
    responses(
        (status = 200, description = "Image deleted", body = DeleteImageResponse),
        (status = 400, description = "Invalid filename", body = ProblemDetails),
        (status = 404, description = "No image with that filename", body = ProblemDetails),
        (status = 500, description = "Storage I/O failure", body = ProblemDetails)
    )
)]
async fn delete_image(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, Problem> {
    state.repository.delete(&filename).await?;
    info!("Deleted {}", filename);

    Ok(Json(DeleteImageResponse {
        message: format!("File {} deleted successfully.", filename),
    }))
}
