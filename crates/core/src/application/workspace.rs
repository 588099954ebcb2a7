// Workspace reset
//
// Delete-then-recreate as a single operation so every caller gets the same
// error semantics. Irreversible: there is no backup and no confirmation.

use std::io;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::port::{EntryKind, Filesystem};

/// Leave `work_dir` as an existing, empty directory
///
/// # Errors
/// - `Configuration` if `work_dir` exists but is not a directory, or is a
///   symlink (nothing is deleted)
/// - `Io` if deletion or creation fails, or the dir is not empty afterwards
pub async fn reset_workspace(fs: &dyn Filesystem, work_dir: &Path) -> Result<()> {
    match fs
        .entry_kind(work_dir)
        .await
        .map_err(|e| AppError::io(work_dir, e))?
    {
        Some(EntryKind::File) => {
            return Err(AppError::Configuration(format!(
                "Work dir {} exists but is not a directory",
                work_dir.display()
            )));
        }
        Some(EntryKind::Symlink) => {
            return Err(AppError::Configuration(format!(
                "Work dir {} is a symlink, pass the directory it points to instead",
                work_dir.display()
            )));
        }
        Some(EntryKind::Directory) => {
            warn!(work_dir = %work_dir.display(), "Removing existing work dir");
            fs.remove_dir_all(work_dir)
                .await
                .map_err(|e| AppError::io(work_dir, e))?;
        }
        None => {}
    }

    fs.create_dir_all(work_dir)
        .await
        .map_err(|e| AppError::io(work_dir, e))?;

    // Something else writing here means the dir is not ours alone
    if !fs
        .is_empty_dir(work_dir)
        .await
        .map_err(|e| AppError::io(work_dir, e))?
    {
        return Err(AppError::io(
            work_dir,
            io::Error::new(io::ErrorKind::Other, "work dir not empty after reset"),
        ));
    }

    info!(work_dir = %work_dir.display(), "Work dir ready");
    Ok(())
}
