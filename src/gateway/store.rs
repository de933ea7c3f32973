use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

/// Flat per-session file store: `<root>/<session_id>/<filename>`.
///
/// Session directories are created lazily. An upload naming a session that
/// was never created simply materializes its directory, and a second write
/// to the same `(session_id, filename)` pair overwrites the first. There is
/// no index beyond the directory tree itself.
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Allocates a fresh session id and creates its (empty) directory.
    pub async fn create_session(&self) -> io::Result<String> {
        let session_id = new_session_id();
        tokio::fs::create_dir_all(self.root.join(&session_id)).await?;
        debug!("created session {}", session_id);
        Ok(session_id)
    }

    /// Writes `bytes` under the session directory, creating the directory if
    /// it does not exist yet. Returns the destination path and size.
    pub async fn save(
        &self,
        session_id: &str,
        filename: &str,
        bytes: &[u8],
    ) -> io::Result<(PathBuf, usize)> {
        let dir = self.root.join(session_id);
        tokio::fs::create_dir_all(&dir).await?;

        let dest = dir.join(filename);
        tokio::fs::write(&dest, bytes).await?;
        Ok((dest, bytes.len()))
    }
}

/// First 8 characters of a hyphenated UUIDv4. Uniqueness rides on the
/// generator; there is no collision check against existing directories.
fn new_session_id() -> String {
    Uuid::new_v4().to_string()[..8].to_string()
}
