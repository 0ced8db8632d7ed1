//! Ingestion engine integration tests against a temporary directory

use bytes::Bytes;
use futures::{stream, StreamExt};
use imgstash_storage::{IngestEngine, StorageError, UploadPolicy};
use tempfile::tempdir;

const TEST_CEILING: u64 = 2_621_440;

fn engine_in(dir: &std::path::Path) -> IngestEngine {
    IngestEngine::new(dir, UploadPolicy::default(), TEST_CEILING)
}

fn byte_stream(chunks: Vec<Vec<u8>>) -> impl futures::Stream<Item = std::io::Result<Bytes>> + Unpin {
    stream::iter(chunks.into_iter().map(|c| Ok(Bytes::from(c))))
}

#[tokio::test]
async fn accepted_upload_is_persisted_with_exact_length() {
    let dir = tempdir().unwrap();
    let engine = engine_in(dir.path());

    let payload = vec![0xAB; 500 * 1024];
    let stored = engine
        .ingest("image", "photo.png", "image/png", byte_stream(vec![payload.clone()]))
        .await
        .unwrap();

    assert!(stored.filename.starts_with("image-"));
    assert!(stored.filename.ends_with(".png"));
    assert_eq!(stored.size, payload.len() as u64);

    let on_disk = std::fs::read(dir.path().join(&stored.filename)).unwrap();
    assert_eq!(on_disk.len(), payload.len());
}

#[tokio::test]
async fn extension_is_lowercased_in_stored_name() {
    let dir = tempdir().unwrap();
    let engine = engine_in(dir.path());

    let stored = engine
        .ingest("image", "SHOUTING.JPG", "image/jpeg", byte_stream(vec![vec![1, 2, 3]]))
        .await
        .unwrap();

    assert!(stored.filename.ends_with(".jpg"));
}

#[tokio::test]
async fn unsupported_type_writes_nothing() {
    let dir = tempdir().unwrap();
    let engine = engine_in(dir.path());

    let err = engine
        .ingest(
            "image",
            "doc.pdf",
            "application/pdf",
            byte_stream(vec![vec![1, 2, 3]]),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::UnsupportedType { .. }));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn spoofed_content_type_is_rejected() {
    let dir = tempdir().unwrap();
    let engine = engine_in(dir.path());

    // Correct extension, wrong declared type: AND semantics, must fail
    let err = engine
        .ingest("image", "photo.png", "text/html", byte_stream(vec![vec![1]]))
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::UnsupportedType { .. }));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn oversize_upload_leaves_no_partial_file() {
    let dir = tempdir().unwrap();
    let engine = engine_in(dir.path());

    // 3 MB in 1 MB chunks against a 2.5 MiB ceiling
    let chunks = vec![vec![0u8; 1024 * 1024]; 3];
    let err = engine
        .ingest("image", "big.jpg", "image/jpeg", byte_stream(chunks))
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::TooLarge { limit: TEST_CEILING }));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn stream_error_leaves_no_partial_file() {
    let dir = tempdir().unwrap();
    let engine = engine_in(dir.path());

    let broken = stream::iter(vec![
        Ok(Bytes::from_static(b"first chunk")),
        Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "client went away",
        )),
    ]);

    let err = engine
        .ingest("image", "photo.png", "image/png", broken)
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Io(_)));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn aborted_upload_is_cleaned_up() {
    let dir = tempdir().unwrap();
    let engine = engine_in(dir.path());

    // A stream that delivers one chunk and then stalls; dropping the
    // ingest future models the caller aborting mid-upload.
    let stalled = stream::iter(vec![Ok(Bytes::from_static(b"partial"))])
        .chain(stream::pending::<std::io::Result<Bytes>>());

    let result = tokio::time::timeout(
        std::time::Duration::from_millis(50),
        engine.ingest("image", "photo.png", "image/png", stalled),
    )
    .await;

    assert!(result.is_err(), "ingest should still be pending at timeout");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn identical_original_filenames_get_distinct_stored_names() {
    let dir = tempdir().unwrap();
    let engine = engine_in(dir.path());

    let a = engine
        .ingest("image", "same.png", "image/png", byte_stream(vec![vec![1]]))
        .await
        .unwrap();
    let b = engine
        .ingest("image", "same.png", "image/png", byte_stream(vec![vec![2]]))
        .await
        .unwrap();

    assert_ne!(a.filename, b.filename);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
}
