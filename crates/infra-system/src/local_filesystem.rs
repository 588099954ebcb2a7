// Local filesystem adapter
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use scream_ctest_core::port::filesystem::{EntryKind, Filesystem};

/// tokio::fs against the real disk
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Filesystem for LocalFilesystem {
    async fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        tokio::fs::canonicalize(path).await
    }

    async fn entry_kind(&self, path: &Path) -> io::Result<Option<EntryKind>> {
        // symlink_metadata: remove_dir_all would only unlink a symlink, so it
        // must not look like a directory here
        match tokio::fs::symlink_metadata(path).await {
            Ok(meta) if meta.file_type().is_symlink() => Ok(Some(EntryKind::Symlink)),
            Ok(meta) if meta.is_dir() => Ok(Some(EntryKind::Directory)),
            Ok(_) => Ok(Some(EntryKind::File)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        debug!(path = %path.display(), "remove_dir_all");
        tokio::fs::remove_dir_all(path).await
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        debug!(path = %path.display(), "create_dir_all");
        tokio::fs::create_dir_all(path).await
    }

    async fn is_empty_dir(&self, path: &Path) -> io::Result<bool> {
        let mut entries = tokio::fs::read_dir(path).await?;
        Ok(entries.next_entry().await?.is_none())
    }
}
