//! Blob repository integration tests against a temporary directory

use imgstash_storage::{BlobRepository, StorageError};
use tempfile::tempdir;

fn touch(dir: &std::path::Path, name: &str) {
    std::fs::write(dir.join(name), b"x").unwrap();
}

#[tokio::test]
async fn list_returns_only_allowed_extensions() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "a.png");
    touch(dir.path(), "b.JPG");
    touch(dir.path(), "c.gif");
    touch(dir.path(), "d.webp");
    // Placed out-of-band; must be silently excluded
    touch(dir.path(), "notes.txt");
    touch(dir.path(), "archive.pdf");
    touch(dir.path(), ".DS_Store");

    let repo = BlobRepository::new(dir.path());
    let mut names: Vec<String> = repo
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.filename)
        .collect();
    names.sort();

    assert_eq!(names, vec!["a.png", "b.JPG", "c.gif", "d.webp"]);
}

#[tokio::test]
async fn list_skips_subdirectories() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "a.png");
    std::fs::create_dir(dir.path().join("nested.png")).unwrap();

    let repo = BlobRepository::new(dir.path());
    let blobs = repo.list().await.unwrap();

    assert_eq!(blobs.len(), 1);
    assert_eq!(blobs[0].filename, "a.png");
}

#[tokio::test]
async fn search_is_exact_and_case_sensitive() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "image-1-2.png");

    let repo = BlobRepository::new(dir.path());

    let hit = repo.search("image-1-2.png").await.unwrap();
    assert_eq!(hit.unwrap().filename, "image-1-2.png");

    assert!(repo.search("IMAGE-1-2.PNG").await.unwrap().is_none());
    assert!(repo.search("image-1-2").await.unwrap().is_none());
    assert!(repo.search("missing.png").await.unwrap().is_none());
}

#[tokio::test]
async fn delete_then_search_yields_not_found() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "image-1-2.png");

    let repo = BlobRepository::new(dir.path());
    repo.delete("image-1-2.png").await.unwrap();

    assert!(repo.search("image-1-2.png").await.unwrap().is_none());
    assert!(!dir.path().join("image-1-2.png").exists());
}

#[tokio::test]
async fn delete_missing_file_is_not_found() {
    let dir = tempdir().unwrap();
    let repo = BlobRepository::new(dir.path());

    let err = repo.delete("missing.png").await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

#[tokio::test]
async fn delete_rejects_path_traversal_before_touching_fs() {
    let dir = tempdir().unwrap();
    let repo = BlobRepository::new(dir.path());

    for candidate in ["../../etc/passwd", "..", "a/b.png", "a\\b.png", ""] {
        let err = repo.delete(candidate).await.unwrap_err();
        assert!(
            matches!(err, StorageError::InvalidFilename(_)),
            "{candidate:?} should be rejected as invalid"
        );
    }
}

#[tokio::test]
async fn resolve_rejects_traversal() {
    let dir = tempdir().unwrap();
    let repo = BlobRepository::new(dir.path());

    assert!(repo.resolve("../secret.png").is_err());
    let path = repo.resolve("a.png").unwrap();
    assert_eq!(path, dir.path().join("a.png"));
}
