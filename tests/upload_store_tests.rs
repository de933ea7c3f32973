// Byte-level tests for the flat per-session upload store.

use anyhow::Result;
use tempfile::TempDir;
use voxbridge::gateway::UploadStore;

#[tokio::test]
async fn saved_bytes_round_trip_exactly() -> Result<()> {
    let root = TempDir::new()?;
    let store = UploadStore::new(root.path());

    let payload: Vec<u8> = (0..=255).collect();
    let (path, size) = store.save("abc12345", "clip1.m4a", &payload).await?;

    assert_eq!(size, payload.len());
    assert_eq!(std::fs::read(&path)?, payload);
    assert!(path.ends_with("abc12345/clip1.m4a"));
    Ok(())
}

#[tokio::test]
async fn second_write_overwrites_the_first() -> Result<()> {
    let root = TempDir::new()?;
    let store = UploadStore::new(root.path());

    store.save("abc12345", "clip1.m4a", b"first payload").await?;
    let (path, _) = store.save("abc12345", "clip1.m4a", b"second").await?;

    assert_eq!(std::fs::read(&path)?, b"second");
    Ok(())
}

#[tokio::test]
async fn unknown_session_directory_is_materialized_on_upload() -> Result<()> {
    let root = TempDir::new()?;
    let store = UploadStore::new(root.path());

    let dir = root.path().join("never1ed");
    assert!(!dir.exists());

    store.save("never1ed", "clip.m4a", b"bytes").await?;
    assert!(dir.is_dir());
    Ok(())
}

#[tokio::test]
async fn create_session_allocates_distinct_empty_directories() -> Result<()> {
    let root = TempDir::new()?;
    let store = UploadStore::new(root.path());

    let first = store.create_session().await?;
    let second = store.create_session().await?;

    assert_ne!(first, second);
    for id in [&first, &second] {
        assert_eq!(id.len(), 8);
        let dir = root.path().join(id);
        assert!(dir.is_dir());
        assert_eq!(std::fs::read_dir(&dir)?.count(), 0);
    }
    Ok(())
}
