// Central Error Type for the driver

use thiserror::Error;

/// Driver-level error type
///
/// A failing test run is NOT an error: it is reported as `Ok(false)` by
/// [`crate::ScriptsCtestDriver::run`]. Errors here mean the driver itself
/// could not do its job.
#[derive(Error, Debug)]
pub enum AppError {
    /// Unresolvable machine, bad root-dir layout, or a work dir occupied by a file
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Execution error: {0}")]
    Execution(#[from] crate::port::ExecutionError),
}

impl AppError {
    /// Wrap an IO error with the path it happened on
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.display().to_string(),
            source,
        }
    }

    /// True for errors that can never succeed on retry with the same inputs
    pub fn is_configuration(&self) -> bool {
        matches!(self, AppError::Configuration(_))
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
