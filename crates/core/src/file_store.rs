//! Local binary file storage for track audio and avatars.
//!
//! Files live under a root directory as `<directory>/<owner_id>_<file_name>`.
//! Stored paths are relative to the root so the root can move between
//! deployments. Every read and write holds the per-path lock for its file:
//! work on different files runs in parallel, a reader never observes a
//! half-written file.

use std::path::{Component, Path, PathBuf};

use crate::locks::KeyedLocks;
use crate::types::DbId;

/// Subdirectory for uploaded track audio.
pub const TRACKS_DIR: &str = "tracks";

/// Subdirectory for user avatars.
pub const AVATARS_DIR: &str = "avatars";

#[derive(Debug, thiserror::Error)]
pub enum FileStoreError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid file name: {0}")]
    InvalidName(String),

    #[error("Invalid stored path: {0}")]
    InvalidPath(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Filesystem-backed store with per-path locking.
pub struct LocalFileStore {
    root: PathBuf,
    locks: KeyedLocks<PathBuf>,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: KeyedLocks::new(),
        }
    }

    /// Write `bytes` as `<directory>/<owner_id>_<file_name>` and return the
    /// stored (root-relative) path. An existing file at that path is replaced.
    pub async fn write(
        &self,
        bytes: &[u8],
        owner_id: DbId,
        directory: &str,
        file_name: &str,
    ) -> Result<String, FileStoreError> {
        let file_name = sanitize_file_name(file_name)?;
        let relative = Path::new(directory).join(format!("{owner_id}_{file_name}"));
        let full = self.resolve(&relative)?;

        let _guard = self.locks.lock(full.clone()).await;

        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| io_error(parent, source))?;
        }
        tokio::fs::write(&full, bytes)
            .await
            .map_err(|source| io_error(&full, source))?;

        tracing::debug!(path = %full.display(), size = bytes.len(), "Stored file");
        Ok(relative.to_string_lossy().into_owned())
    }

    /// Read the file at a stored path.
    pub async fn read(&self, stored_path: &str) -> Result<Vec<u8>, FileStoreError> {
        let full = self.resolve(Path::new(stored_path))?;

        let _guard = self.locks.lock(full.clone()).await;

        match tokio::fs::read(&full).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(FileStoreError::NotFound(stored_path.to_string()))
            }
            Err(source) => Err(io_error(&full, source)),
        }
    }

    /// Number of files currently being read or written.
    pub fn files_in_use(&self) -> usize {
        self.locks.active_keys()
    }

    /// Join a stored path onto the root, rejecting anything that could escape it.
    fn resolve(&self, relative: &Path) -> Result<PathBuf, FileStoreError> {
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes || relative.as_os_str().is_empty() {
            return Err(FileStoreError::InvalidPath(
                relative.to_string_lossy().into_owned(),
            ));
        }
        Ok(self.root.join(relative))
    }
}

/// Reduce an uploaded file name to its final path component.
pub fn sanitize_file_name(file_name: &str) -> Result<String, FileStoreError> {
    let last = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if last.is_empty() || last == "." || last == ".." {
        return Err(FileStoreError::InvalidName(file_name.to_string()));
    }
    Ok(last.to_string())
}

/// Lowercased extension of `path` without the dot, if any.
pub fn extension_of(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// MIME type for a stored image, chosen by extension.
pub fn content_type_for(path: &str) -> &'static str {
    match extension_of(path).as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

fn io_error(path: &Path, source: std::io::Error) -> FileStoreError {
    FileStoreError::Io {
        path: path.display().to_string(),
        source,
    }
}
