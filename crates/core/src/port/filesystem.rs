// Filesystem Port
// Everything the driver needs to check the checkout and reset the work dir

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};

/// What sits at a path. Symlinks are reported as such, never followed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
    Symlink,
}

/// Filesystem trait
///
/// Implementations:
/// - LocalFilesystem: tokio::fs against the real disk
/// - InMemoryFilesystem (mocks): path table for tests
#[async_trait]
pub trait Filesystem: Send + Sync {
    /// Absolute path with symlinks and `..` resolved. Fails if it does not exist
    async fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

    /// None if nothing exists at `path`. A symlink is `Symlink` whatever it points to
    async fn entry_kind(&self, path: &Path) -> io::Result<Option<EntryKind>>;

    /// Recursively delete a directory and everything below it
    async fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Create a directory and any missing parents
    async fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// True if `path` is a directory with no entries
    async fn is_empty_dir(&self, path: &Path) -> io::Result<bool>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::Component;
    use std::sync::{Arc, Mutex};

    /// Mutating call recorded by [`InMemoryFilesystem`]
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum FsOp {
        RemoveDirAll(PathBuf),
        CreateDirAll(PathBuf),
    }

    /// In-memory filesystem keyed by absolute path
    #[derive(Default)]
    pub struct InMemoryFilesystem {
        entries: Arc<Mutex<BTreeMap<PathBuf, EntryKind>>>,
        ops: Arc<Mutex<Vec<FsOp>>>,
    }

    impl InMemoryFilesystem {
        pub fn new() -> Self {
            Self::default()
        }

        /// Seed a directory (and its ancestors)
        pub fn with_dir(self, path: impl AsRef<Path>) -> Self {
            {
                let mut entries = self.entries.lock().unwrap();
                for ancestor in path.as_ref().ancestors() {
                    entries.insert(ancestor.to_path_buf(), EntryKind::Directory);
                }
            }
            self
        }

        /// Seed a regular file (ancestors become directories)
        pub fn with_file(self, path: impl AsRef<Path>) -> Self {
            let path = path.as_ref();
            let this = match path.parent() {
                Some(parent) => self.with_dir(parent),
                None => self,
            };
            this.entries
                .lock()
                .unwrap()
                .insert(path.to_path_buf(), EntryKind::File);
            this
        }

        /// Seed a symlink entry (ancestors become directories)
        pub fn with_symlink(self, path: impl AsRef<Path>) -> Self {
            let path = path.as_ref();
            let this = match path.parent() {
                Some(parent) => self.with_dir(parent),
                None => self,
            };
            this.entries
                .lock()
                .unwrap()
                .insert(path.to_path_buf(), EntryKind::Symlink);
            this
        }

        pub fn ops(&self) -> Vec<FsOp> {
            self.ops.lock().unwrap().clone()
        }

        pub fn kind_of(&self, path: impl AsRef<Path>) -> Option<EntryKind> {
            self.entries.lock().unwrap().get(path.as_ref()).copied()
        }

        fn normalize(path: &Path) -> PathBuf {
            let mut out = PathBuf::new();
            for component in path.components() {
                match component {
                    Component::ParentDir => {
                        out.pop();
                    }
                    Component::CurDir => {}
                    other => out.push(other.as_os_str()),
                }
            }
            out
        }
    }

    #[async_trait]
    impl Filesystem for InMemoryFilesystem {
        async fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
            let normalized = Self::normalize(path);
            if self.entries.lock().unwrap().contains_key(&normalized) {
                Ok(normalized)
            } else {
                Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} not found", path.display()),
                ))
            }
        }

        async fn entry_kind(&self, path: &Path) -> io::Result<Option<EntryKind>> {
            Ok(self.kind_of(path))
        }

        async fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
            self.ops
                .lock()
                .unwrap()
                .push(FsOp::RemoveDirAll(path.to_path_buf()));

            let mut entries = self.entries.lock().unwrap();
            match entries.get(path).copied() {
                Some(EntryKind::Directory) => {
                    entries.retain(|p, _| !p.starts_with(path));
                    Ok(())
                }
                Some(EntryKind::File) | Some(EntryKind::Symlink) => Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!("{} is not a directory", path.display()),
                )),
                None => Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} not found", path.display()),
                )),
            }
        }

        async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
            self.ops
                .lock()
                .unwrap()
                .push(FsOp::CreateDirAll(path.to_path_buf()));

            let mut entries = self.entries.lock().unwrap();
            for ancestor in path.ancestors() {
                if entries.get(ancestor) == Some(&EntryKind::File) {
                    return Err(io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!("{} is a file", ancestor.display()),
                    ));
                }
            }
            for ancestor in path.ancestors() {
                entries.insert(ancestor.to_path_buf(), EntryKind::Directory);
            }
            Ok(())
        }

        async fn is_empty_dir(&self, path: &Path) -> io::Result<bool> {
            let entries = self.entries.lock().unwrap();
            if entries.get(path) != Some(&EntryKind::Directory) {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} is not a directory", path.display()),
                ));
            }
            Ok(!entries.keys().any(|p| p.parent() == Some(path)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::{FsOp, InMemoryFilesystem};
    use super::*;

    #[tokio::test]
    async fn test_in_memory_remove_is_recursive() {
        let fs = InMemoryFilesystem::new()
            .with_dir("/w/sub")
            .with_file("/w/sub/stray.txt");

        fs.remove_dir_all(Path::new("/w")).await.unwrap();

        assert_eq!(fs.kind_of("/w"), None);
        assert_eq!(fs.kind_of("/w/sub/stray.txt"), None);
        assert_eq!(fs.kind_of("/"), Some(EntryKind::Directory));
        assert_eq!(fs.ops(), vec![FsOp::RemoveDirAll(PathBuf::from("/w"))]);
    }

    #[tokio::test]
    async fn test_in_memory_canonicalize() {
        let fs = InMemoryFilesystem::new().with_dir("/repo/components/scream");

        let resolved = fs
            .canonicalize(Path::new("/repo/components/scream/scripts/.."))
            .await
            .unwrap();
        assert_eq!(resolved, PathBuf::from("/repo/components/scream"));

        assert!(fs.canonicalize(Path::new("/missing")).await.is_err());
    }

    #[tokio::test]
    async fn test_in_memory_empty_dir() {
        let fs = InMemoryFilesystem::new().with_file("/w/a");

        assert!(!fs.is_empty_dir(Path::new("/w")).await.unwrap());
        fs.create_dir_all(Path::new("/x/y")).await.unwrap();
        assert!(fs.is_empty_dir(Path::new("/x/y")).await.unwrap());
    }
}
