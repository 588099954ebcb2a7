// Command Runner Port
// Abstraction for launching the synthesized ctest line

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// What to run and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    /// Full shell line, handed to the shell unmodified
    pub command_line: String,
    /// Child's current directory
    pub working_dir: PathBuf,
    /// Inherit stdout/stderr instead of capturing them
    pub stream_output: bool,
    /// Skip the launch and report a synthetic zero exit
    pub dry_run: bool,
}

/// Result of running a command
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    pub duration_ms: i64,
    /// None when the child was killed by a signal
    pub exit_code: Option<i32>,
    /// Only populated when output was captured
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

impl ExecutionResult {
    /// Result reported for a dry run: exit 0, nothing launched
    pub fn dry_run() -> Self {
        Self {
            status: ExecutionStatus::DryRun,
            duration_ms: 0,
            exit_code: Some(0),
            stdout: None,
            stderr: None,
        }
    }

    /// Exit status exactly zero
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Execution status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    Success,
    Failed,
    DryRun,
}

/// Execution errors
///
/// Only raised when the command could not be launched or awaited. A command
/// that ran and exited non-zero is an `Ok` result with `Failed` status.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Command Runner trait
///
/// Implementations:
/// - ShellCommandRunner: `sh -c <line>` in the working dir
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command line to completion
    ///
    /// # Errors
    /// - ExecutionError::SpawnFailed if the shell cannot be started
    /// - ExecutionError::IoError if waiting on the child fails
    async fn run(&self, request: &CommandRequest) -> Result<ExecutionResult, ExecutionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock runner behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Exit with this code
        Exit(i32),
        /// Fail to spawn with message
        SpawnFail(String),
    }

    /// Mock Command Runner that records every request
    ///
    /// Honors `dry_run` the way real runners must: the request is recorded
    /// but never counted as a launch.
    pub struct MockCommandRunner {
        behavior: Arc<Mutex<MockBehavior>>,
        requests: Arc<Mutex<Vec<CommandRequest>>>,
        launches: Arc<Mutex<usize>>,
    }

    impl MockCommandRunner {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                requests: Arc::new(Mutex::new(Vec::new())),
                launches: Arc::new(Mutex::new(0)),
            }
        }

        pub fn new_exit(code: i32) -> Self {
            Self::new(MockBehavior::Exit(code))
        }

        pub fn new_spawn_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::SpawnFail(message.into()))
        }

        pub fn requests(&self) -> Vec<CommandRequest> {
            self.requests.lock().unwrap().clone()
        }

        /// Number of commands that would actually have been launched
        pub fn launch_count(&self) -> usize {
            *self.launches.lock().unwrap()
        }
    }

    #[async_trait]
    impl CommandRunner for MockCommandRunner {
        async fn run(&self, request: &CommandRequest) -> Result<ExecutionResult, ExecutionError> {
            self.requests.lock().unwrap().push(request.clone());

            if request.dry_run {
                return Ok(ExecutionResult::dry_run());
            }

            *self.launches.lock().unwrap() += 1;

            let behavior = self.behavior.lock().unwrap().clone();

            match behavior {
                MockBehavior::Exit(code) => Ok(ExecutionResult {
                    status: if code == 0 {
                        ExecutionStatus::Success
                    } else {
                        ExecutionStatus::Failed
                    },
                    duration_ms: 10,
                    exit_code: Some(code),
                    stdout: None,
                    stderr: None,
                }),
                MockBehavior::SpawnFail(msg) => Err(ExecutionError::SpawnFailed(msg)),
            }
        }
    }
}
