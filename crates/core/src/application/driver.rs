// scripts-ctest driver
//
// Construction resolves identity and paths, then resets the work dir. After
// that the driver is immutable: synthesis is pure and `run` only reads state.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use super::constants::{
    BUILD_WORK_DIR_DEFINE, CIME_MACHINE_ENV, CTEST_BASE_ARGS, CTEST_PARALLEL_LEVEL,
    CTEST_PARALLEL_LEVEL_ENV, CTEST_PROGRAM, CTEST_SCRIPT_PATH, NO_SUBMIT_DEFINE,
    SCREAM_ROOT_DEFINE,
};
use super::resolution::{resolve_machine, resolve_root_dir, resolve_work_dir};
use super::workspace::reset_workspace;
use crate::domain::{CtestCommand, DriverOptions, ExtraConfig, MachineName};
use crate::error::Result;
use crate::port::{CommandRequest, CommandRunner, EnvProvider, Filesystem, MachineSupport};

/// Adapters the driver talks to
#[derive(Clone)]
pub struct DriverDeps {
    pub env: Arc<dyn EnvProvider>,
    pub machine_support: Arc<dyn MachineSupport>,
    pub filesystem: Arc<dyn Filesystem>,
    pub runner: Arc<dyn CommandRunner>,
    /// Where the driver itself lives; the default root is two levels above it
    pub install_path: PathBuf,
}

/// Drives the SCREAM scripts tests through ctest
pub struct ScriptsCtestDriver {
    submit: bool,
    machine: MachineName,
    root_dir: PathBuf,
    work_dir: PathBuf,
    dry_run: bool,
    runner: Arc<dyn CommandRunner>,
}

impl ScriptsCtestDriver {
    /// Resolve machine, root dir and work dir, then reset the work dir
    ///
    /// The reset happens in dry-run mode too: dry run only skips launching
    /// ctest. Prior contents of the work dir are gone once this returns.
    ///
    /// # Errors
    /// - `Configuration` for an unresolvable machine, a bad root dir, or a
    ///   work dir path occupied by a file. All of these are raised before
    ///   anything is deleted.
    /// - `Io` if the reset itself fails
    pub async fn new(options: DriverOptions, deps: &DriverDeps) -> Result<Self> {
        let machine = resolve_machine(
            options.machine.as_deref(),
            deps.env.as_ref(),
            deps.machine_support.as_ref(),
        )?;

        let root_dir = resolve_root_dir(
            options.root_dir.as_deref(),
            &deps.install_path,
            deps.env.as_ref(),
            deps.filesystem.as_ref(),
        )
        .await?;

        let work_dir = resolve_work_dir(options.work_dir.as_deref(), &root_dir, deps.env.as_ref())?;

        info!(
            machine = %machine,
            root_dir = %root_dir.display(),
            work_dir = %work_dir.display(),
            submit = options.submit,
            dry_run = options.dry_run,
            "Driver configuration resolved"
        );

        if options.dry_run {
            warn!(work_dir = %work_dir.display(), "Dry run still resets the work dir");
        }

        reset_workspace(deps.filesystem.as_ref(), &work_dir).await?;

        Ok(Self {
            submit: options.submit,
            machine,
            root_dir,
            work_dir,
            dry_run: options.dry_run,
            runner: deps.runner.clone(),
        })
    }

    pub fn machine(&self) -> &MachineName {
        &self.machine
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn submit(&self) -> bool {
        self.submit
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Structured ctest invocation
    ///
    /// Order: env prefix, base command, `NO_SUBMIT` (only when not
    /// submitting), extras in input order (duplicates kept), `SCREAM_ROOT`,
    /// `BUILD_WORK_DIR`, `-S <script>`.
    pub fn ctest_command(&self, extra_configs: &[ExtraConfig]) -> CtestCommand {
        let mut command = CtestCommand::new(CTEST_PROGRAM)
            .env(CTEST_PARALLEL_LEVEL_ENV, CTEST_PARALLEL_LEVEL)
            .env(CIME_MACHINE_ENV, self.machine.as_str());

        for arg in CTEST_BASE_ARGS {
            command = command.arg(arg);
        }

        if !self.submit {
            command = command.define(NO_SUBMIT_DEFINE, "True");
        }

        for (key, value) in extra_configs {
            command = command.define(key, value);
        }

        command
            .define(SCREAM_ROOT_DEFINE, self.root_dir.display())
            .define(BUILD_WORK_DIR_DEFINE, self.work_dir.display())
            .script(format!("{}/{}", self.root_dir.display(), CTEST_SCRIPT_PATH))
    }

    /// The ctest line as handed to the shell. Paths and values are NOT escaped
    pub fn generate_ctest_config(&self, extra_configs: &[ExtraConfig]) -> String {
        self.ctest_command(extra_configs).to_shell_line()
    }

    /// Run the scripts tests with no extra defines
    ///
    /// `Ok(false)` means ctest ran and exited non-zero.
    pub async fn run(&self) -> Result<bool> {
        self.run_with(&[]).await
    }

    /// Run with caller-supplied extra defines. Single attempt, never retried
    ///
    /// # Errors
    /// - `Execution` if the command could not be launched at all
    pub async fn run_with(&self, extra_configs: &[ExtraConfig]) -> Result<bool> {
        let request = CommandRequest {
            command_line: self.generate_ctest_config(extra_configs),
            working_dir: self.work_dir.clone(),
            stream_output: true,
            dry_run: self.dry_run,
        };

        info!(
            command = %request.command_line,
            work_dir = %self.work_dir.display(),
            dry_run = self.dry_run,
            "Running ctest"
        );

        let result = self.runner.run(&request).await?;
        let success = result.is_success();

        if success {
            info!(
                exit_code = ?result.exit_code,
                duration_ms = result.duration_ms,
                status = ?result.status,
                "ctest passed"
            );
        } else {
            warn!(
                exit_code = ?result.exit_code,
                duration_ms = result.duration_ms,
                "ctest failed"
            );
        }

        Ok(success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::port::command_runner::mocks::MockCommandRunner;
    use crate::port::env_provider::mocks::MockEnvProvider;
    use crate::port::filesystem::mocks::{FsOp, InMemoryFilesystem};
    use crate::port::machine_support::mocks::MockMachineSupport;
    use crate::port::EntryKind;

    const ROOT: &str = "/repo/components/scream";
    const INSTALL: &str = "/repo/components/scream/scripts/scripts-ctest-driver";
    const WORK: &str = "/repo/components/scream/ctest-build-scripts";
    const SCRIPT: &str = "/repo/components/scream/cmake/ctest_script_scripts_tests.cmake";

    struct Harness {
        fs: Arc<InMemoryFilesystem>,
        runner: Arc<MockCommandRunner>,
        deps: DriverDeps,
    }

    fn harness_with(env: MockEnvProvider, fs: InMemoryFilesystem, exit_code: i32) -> Harness {
        let fs = Arc::new(fs);
        let runner = Arc::new(MockCommandRunner::new_exit(exit_code));
        let deps = DriverDeps {
            env: Arc::new(env),
            machine_support: Arc::new(MockMachineSupport::new(&["mappy", "weaver"])),
            filesystem: fs.clone(),
            runner: runner.clone(),
            install_path: PathBuf::from(INSTALL),
        };
        Harness { fs, runner, deps }
    }

    fn harness(exit_code: i32) -> Harness {
        harness_with(
            MockEnvProvider::new("/home/ci"),
            InMemoryFilesystem::new().with_file(INSTALL),
            exit_code,
        )
    }

    fn mappy() -> DriverOptions {
        DriverOptions::default().with_machine("mappy")
    }

    #[tokio::test]
    async fn test_scenario_a_no_submit_no_extras() {
        let h = harness(0);
        let driver = ScriptsCtestDriver::new(mappy(), &h.deps).await.unwrap();

        let cmd = driver.generate_ctest_config(&[]);

        assert!(cmd.contains("CIME_MACHINE=mappy"));
        assert!(cmd.contains("-DNO_SUBMIT=True"));
        assert!(cmd.ends_with(SCRIPT));
        assert_eq!(
            cmd,
            format!(
                "CTEST_PARALLEL_LEVEL=1 CIME_MACHINE=mappy ctest -j1 -V --output-on-failure \
                 -DNO_SUBMIT=True -DSCREAM_ROOT={} -DBUILD_WORK_DIR={} -S {}",
                ROOT, WORK, SCRIPT
            )
        );
    }

    #[tokio::test]
    async fn test_scenario_b_submit_omits_no_submit() {
        let h = harness(0);
        let driver = ScriptsCtestDriver::new(mappy().with_submit(true), &h.deps)
            .await
            .unwrap();

        let cmd = driver.generate_ctest_config(&[]);
        assert!(!cmd.contains("NO_SUBMIT"));
        assert!(cmd.starts_with(
            "CTEST_PARALLEL_LEVEL=1 CIME_MACHINE=mappy ctest -j1 -V --output-on-failure -DSCREAM_ROOT="
        ));
    }

    #[tokio::test]
    async fn test_scenario_c_duplicate_extras_in_order() {
        let h = harness(0);
        let driver = ScriptsCtestDriver::new(mappy(), &h.deps).await.unwrap();

        let extras = vec![
            ("FOO".to_string(), "1".to_string()),
            ("FOO".to_string(), "2".to_string()),
        ];
        let cmd = driver.generate_ctest_config(&extras);

        let first = cmd.find("-DFOO=1").unwrap();
        let second = cmd.find("-DFOO=2").unwrap();
        let root = cmd.find("-DSCREAM_ROOT=").unwrap();
        let no_submit = cmd.find("-DNO_SUBMIT=True").unwrap();
        assert!(no_submit < first);
        assert!(first < second);
        assert!(second < root);
    }

    #[tokio::test]
    async fn test_scenario_d_dry_run_resets_but_does_not_launch() {
        let h = harness_with(
            MockEnvProvider::new("/home/ci"),
            InMemoryFilesystem::new()
                .with_file(INSTALL)
                .with_file(format!("{}/stray.txt", WORK)),
            1,
        );

        let driver = ScriptsCtestDriver::new(mappy().with_dry_run(true), &h.deps)
            .await
            .unwrap();

        assert_eq!(h.fs.kind_of(format!("{}/stray.txt", WORK)), None);
        assert!(h.fs.is_empty_dir(Path::new(WORK)).await.unwrap());

        // Runner would exit 1 if launched; dry run reports success instead
        assert!(driver.run().await.unwrap());
        assert_eq!(h.runner.launch_count(), 0);
        assert!(h.runner.requests()[0].dry_run);
    }

    #[tokio::test]
    async fn test_scenario_e_work_dir_is_file() {
        let h = harness_with(
            MockEnvProvider::new("/home/ci"),
            InMemoryFilesystem::new().with_file(INSTALL).with_file("/tmp/work"),
            0,
        );

        let result = ScriptsCtestDriver::new(mappy().with_work_dir("/tmp/work"), &h.deps).await;

        assert!(matches!(result, Err(AppError::Configuration(_))));
        assert!(h.fs.ops().is_empty());
        assert_eq!(h.fs.kind_of("/tmp/work"), Some(EntryKind::File));
    }

    #[tokio::test]
    async fn test_env_machine_used_when_not_explicit() {
        let h = harness_with(
            MockEnvProvider::new("/home/ci").with_var(CIME_MACHINE_ENV, "weaver"),
            InMemoryFilesystem::new().with_file(INSTALL),
            0,
        );

        let driver = ScriptsCtestDriver::new(DriverOptions::default(), &h.deps)
            .await
            .unwrap();
        assert_eq!(driver.machine().as_str(), "weaver");
    }

    #[tokio::test]
    async fn test_unresolved_machine_fails_before_reset() {
        let h = harness_with(
            MockEnvProvider::new("/home/ci").with_var(CIME_MACHINE_ENV, "laptop"),
            InMemoryFilesystem::new()
                .with_file(INSTALL)
                .with_file(format!("{}/keep.txt", WORK)),
            0,
        );

        let result = ScriptsCtestDriver::new(DriverOptions::default(), &h.deps).await;

        assert!(matches!(result, Err(AppError::Configuration(_))));
        assert!(h.fs.ops().is_empty());
    }

    #[tokio::test]
    async fn test_bad_root_fails_before_reset() {
        let h = harness_with(
            MockEnvProvider::new("/home/ci"),
            InMemoryFilesystem::new()
                .with_file(INSTALL)
                .with_dir("/repo/eamxx")
                .with_file("/tmp/work/keep.txt"),
            0,
        );

        let options = mappy().with_root_dir("/repo/eamxx").with_work_dir("/tmp/work");
        let result = ScriptsCtestDriver::new(options, &h.deps).await;

        assert!(matches!(result, Err(AppError::Configuration(_))));
        assert!(h.fs.ops().is_empty());
        assert_eq!(h.fs.kind_of("/tmp/work/keep.txt"), Some(EntryKind::File));
    }

    #[tokio::test]
    async fn test_explicit_paths() {
        let h = harness_with(
            MockEnvProvider::new("/home/ci"),
            InMemoryFilesystem::new().with_dir("/other/components/scream"),
            0,
        );

        let options = mappy()
            .with_root_dir("/other/components/scream")
            .with_work_dir("scratch");
        let driver = ScriptsCtestDriver::new(options, &h.deps).await.unwrap();

        assert_eq!(driver.root_dir(), Path::new("/other/components/scream"));
        assert_eq!(driver.work_dir(), Path::new("/home/ci/scratch"));
        assert_eq!(
            h.fs.ops(),
            vec![FsOp::CreateDirAll(PathBuf::from("/home/ci/scratch"))]
        );
    }

    #[tokio::test]
    async fn test_synthesis_is_deterministic() {
        let h = harness(0);
        let driver = ScriptsCtestDriver::new(mappy(), &h.deps).await.unwrap();
        let extras = vec![("A".to_string(), "b".to_string())];

        assert_eq!(
            driver.generate_ctest_config(&extras),
            driver.generate_ctest_config(&extras)
        );
        assert_eq!(
            driver.ctest_command(&extras).to_shell_line(),
            driver.generate_ctest_config(&extras)
        );
    }

    #[tokio::test]
    async fn test_run_reports_exit_status() {
        let h = harness(0);
        let driver = ScriptsCtestDriver::new(mappy(), &h.deps).await.unwrap();
        assert!(driver.run().await.unwrap());

        let request = &h.runner.requests()[0];
        assert_eq!(request.working_dir, PathBuf::from(WORK));
        assert!(request.stream_output);
        assert_eq!(request.command_line, driver.generate_ctest_config(&[]));
        assert_eq!(h.runner.launch_count(), 1);

        let h = harness(2);
        let driver = ScriptsCtestDriver::new(mappy(), &h.deps).await.unwrap();
        assert!(!driver.run().await.unwrap());
    }

    #[tokio::test]
    async fn test_run_with_forwards_extras() {
        let h = harness(0);
        let driver = ScriptsCtestDriver::new(mappy(), &h.deps).await.unwrap();

        let extras = vec![("CTEST_BUILD_NAME".to_string(), "nightly".to_string())];
        driver.run_with(&extras).await.unwrap();

        assert!(h.runner.requests()[0]
            .command_line
            .contains("-DCTEST_BUILD_NAME=nightly"));
    }

    #[tokio::test]
    async fn test_spawn_failure_is_an_error() {
        let fs = Arc::new(InMemoryFilesystem::new().with_file(INSTALL));
        let deps = DriverDeps {
            env: Arc::new(MockEnvProvider::new("/")),
            machine_support: Arc::new(MockMachineSupport::none()),
            filesystem: fs,
            runner: Arc::new(MockCommandRunner::new_spawn_fail("no shell")),
            install_path: PathBuf::from(INSTALL),
        };

        let driver = ScriptsCtestDriver::new(mappy(), &deps).await.unwrap();
        assert!(matches!(driver.run().await, Err(AppError::Execution(_))));
    }

    #[tokio::test]
    async fn test_second_run_starts_from_empty_work_dir() {
        let h = harness(0);
        ScriptsCtestDriver::new(mappy(), &h.deps).await.unwrap();

        // Artifacts left behind by the first ctest run
        h.fs.create_dir_all(&PathBuf::from(format!("{}/build", WORK)))
            .await
            .unwrap();

        ScriptsCtestDriver::new(mappy(), &h.deps).await.unwrap();
        assert!(h.fs.is_empty_dir(Path::new(WORK)).await.unwrap());
    }
}
