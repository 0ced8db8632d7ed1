//! imgstash-storage: upload ingestion and blob storage for Imgstash
//!
//! The core of the system: validates incoming file streams against an
//! extension/content-type allow-list, derives collision-resistant on-disk
//! names, persists blobs under a size ceiling, and enumerates/locates/
//! removes stored blobs in a single flat directory. Contains no HTTP types;
//! the server crate is the caller.

pub mod engine;
pub mod error;
pub mod policy;
pub mod repository;

pub use engine::{IngestEngine, StoredBlob};
pub use error::{StorageError, StorageResult};
pub use policy::UploadPolicy;
pub use repository::BlobRepository;
