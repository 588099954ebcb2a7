// Identity & path resolution
//
// Explicit values always win over inferred ones. Nothing here mutates the
// filesystem; destructive work is in `workspace`.

use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

use super::constants::{CIME_MACHINE_ENV, DEFAULT_WORK_DIR_NAME, EXPECTED_ROOT_SEGMENTS};
use crate::domain::MachineName;
use crate::error::{AppError, Result};
use crate::port::{EntryKind, EnvProvider, Filesystem, MachineSupport};

/// Resolve the machine identity
///
/// 1. explicit value, verbatim
/// 2. `CIME_MACHINE` if set and supported
/// 3. otherwise a configuration error
pub fn resolve_machine(
    explicit: Option<&str>,
    env: &dyn EnvProvider,
    support: &dyn MachineSupport,
) -> Result<MachineName> {
    if let Some(machine) = explicit {
        debug!(machine = %machine, "Using explicit machine");
        return Ok(MachineName::new(machine));
    }

    match env.var(CIME_MACHINE_ENV) {
        Some(machine) if support.is_supported(&machine) => {
            info!(machine = %machine, "Using machine from {}", CIME_MACHINE_ENV);
            Ok(MachineName::new(machine))
        }
        Some(machine) => Err(AppError::Configuration(format!(
            "scripts-ctest-driver requires either the machine arg or a supported {} in env \
             ({}='{}' is not supported)",
            CIME_MACHINE_ENV, CIME_MACHINE_ENV, machine
        ))),
        None => Err(AppError::Configuration(format!(
            "scripts-ctest-driver requires either the machine arg or {} in env",
            CIME_MACHINE_ENV
        ))),
    }
}

/// Make `path` absolute against the provider's cwd without touching the disk
pub fn absolutize(path: &Path, env: &dyn EnvProvider) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = env
        .current_dir()
        .map_err(|e| AppError::io(Path::new("."), e))?;
    Ok(cwd.join(path))
}

/// True if the last two segments are `components/scream`
pub fn has_expected_layout(path: &Path) -> bool {
    let tail: Vec<&std::ffi::OsStr> = path
        .components()
        .rev()
        .take(EXPECTED_ROOT_SEGMENTS.len())
        .filter_map(|c| match c {
            Component::Normal(segment) => Some(segment),
            _ => None,
        })
        .collect();

    tail.len() == EXPECTED_ROOT_SEGMENTS.len()
        && tail
            .iter()
            .rev()
            .zip(EXPECTED_ROOT_SEGMENTS.iter())
            .all(|(actual, expected)| *actual == std::ffi::OsStr::new(expected))
}

fn bad_root_dir(path: &Path) -> AppError {
    AppError::Configuration(format!(
        "Bad root-dir '{}', should be: $scream_repo/{}",
        path.display(),
        EXPECTED_ROOT_SEGMENTS.join("/")
    ))
}

/// Resolve the checkout root
///
/// Default: two levels above the driver's own (canonical) location, i.e. the
/// `components/scream` dir whose `scripts/` holds the driver. A supplied root
/// must be an existing directory ending in `components/scream`.
pub async fn resolve_root_dir(
    explicit: Option<&Path>,
    install_path: &Path,
    env: &dyn EnvProvider,
    fs: &dyn Filesystem,
) -> Result<PathBuf> {
    match explicit {
        None => {
            let install_path = absolutize(install_path, env)?;
            let resolved = fs
                .canonicalize(&install_path)
                .await
                .map_err(|e| AppError::io(&install_path, e))?;
            resolved
                .parent()
                .and_then(Path::parent)
                .map(Path::to_path_buf)
                .ok_or_else(|| {
                    AppError::Configuration(format!(
                        "Cannot derive root-dir from driver location '{}'",
                        resolved.display()
                    ))
                })
        }
        Some(root_dir) => {
            let absolute = absolutize(root_dir, env)?;
            let resolved = fs
                .canonicalize(&absolute)
                .await
                .map_err(|_| bad_root_dir(&absolute))?;

            let is_dir = fs
                .entry_kind(&resolved)
                .await
                .map_err(|e| AppError::io(&resolved, e))?
                == Some(EntryKind::Directory);

            if is_dir && has_expected_layout(&resolved) {
                Ok(resolved)
            } else {
                Err(bad_root_dir(&resolved))
            }
        }
    }
}

/// Resolve the work dir: supplied path made absolute, else `<root>/ctest-build-scripts`
pub fn resolve_work_dir(
    explicit: Option<&Path>,
    root_dir: &Path,
    env: &dyn EnvProvider,
) -> Result<PathBuf> {
    match explicit {
        Some(work_dir) => absolutize(work_dir, env),
        None => Ok(absolutize(root_dir, env)?.join(DEFAULT_WORK_DIR_NAME)),
    }
}
