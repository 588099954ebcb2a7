// Shell command runner
// reason: tokio::process so the wait on ctest is the only suspension point
use async_trait::async_trait;
use std::process::{Output, Stdio};
use std::sync::Arc;
use tokio::process::Command;
use tracing::info;

use scream_ctest_core::port::command_runner::{
    CommandRequest, CommandRunner, ExecutionError, ExecutionResult, ExecutionStatus,
};
use scream_ctest_core::port::TimeProvider;

const DEFAULT_SHELL: &str = "sh";

/// Runs a command line through `sh -c` in the request's working dir
///
/// The child inherits the full environment; the `KEY=VALUE` prefix in the
/// command line is what scopes variables to ctest. No retries, no timeout:
/// ctest decides how long the suite takes.
pub struct ShellCommandRunner {
    time_provider: Arc<dyn TimeProvider>,
    shell: String,
}

impl ShellCommandRunner {
    /// Create a runner using `sh`
    ///
    /// # Example
    /// ```ignore
    /// let runner = ShellCommandRunner::new(Arc::new(SystemTimeProvider));
    /// ```
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            time_provider,
            shell: DEFAULT_SHELL.to_string(),
        }
    }

    /// Use a different POSIX shell
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    fn build_command(&self, request: &CommandRequest) -> Command {
        let mut command = Command::new(&self.shell);
        command
            .arg("-c")
            .arg(&request.command_line)
            .current_dir(&request.working_dir);

        if request.stream_output {
            command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        } else {
            command.stdout(Stdio::piped()).stderr(Stdio::piped());
        }

        command
    }

    /// Spawn the shell and block until it exits
    async fn spawn_and_wait(&self, request: &CommandRequest) -> Result<Output, ExecutionError> {
        let child = self
            .build_command(request)
            .spawn()
            .map_err(|e| ExecutionError::SpawnFailed(e.to_string()))?;

        child
            .wait_with_output()
            .await
            .map_err(|e| ExecutionError::IoError(e.to_string()))
    }

    /// Build execution result from process output
    fn build_result(
        &self,
        output: Output,
        stream_output: bool,
        duration_ms: i64,
    ) -> ExecutionResult {
        let status = if output.status.success() {
            ExecutionStatus::Success
        } else {
            ExecutionStatus::Failed
        };

        let (stdout, stderr) = if stream_output {
            (None, None)
        } else {
            (
                Some(String::from_utf8_lossy(&output.stdout).to_string()),
                Some(String::from_utf8_lossy(&output.stderr).to_string()),
            )
        };

        ExecutionResult {
            status,
            exit_code: output.status.code(),
            duration_ms,
            stdout,
            stderr,
        }
    }
}

#[async_trait]
impl CommandRunner for ShellCommandRunner {
    async fn run(&self, request: &CommandRequest) -> Result<ExecutionResult, ExecutionError> {
        if request.dry_run {
            info!(
                command = %request.command_line,
                working_dir = %request.working_dir.display(),
                "Dry run, not launching"
            );
            return Ok(ExecutionResult::dry_run());
        }

        let start_time = self.time_provider.now_millis();

        info!(
            shell = %self.shell,
            working_dir = %request.working_dir.display(),
            "Starting command"
        );

        let output = self.spawn_and_wait(request).await?;

        let duration_ms = self.time_provider.now_millis() - start_time;
        let result = self.build_result(output, request.stream_output, duration_ms);

        info!(
            duration_ms = %duration_ms,
            exit_code = ?result.exit_code,
            status = ?result.status,
            "Command completed"
        );

        Ok(result)
    }
}
