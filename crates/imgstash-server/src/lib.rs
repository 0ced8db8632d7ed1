//! imgstash-server: HTTP layer for the Imgstash image store
//!
//! Thin caller over imgstash-storage: multipart upload (single and
//! multi-field), listing, exact search, deletion, and static serving of
//! stored blobs. All errors surface as RFC 7807 problem responses.

pub mod files;
pub mod handlers;
pub mod types;

pub use handlers::{configure_routes, ImagesApiDoc};
pub use types::AppState;
