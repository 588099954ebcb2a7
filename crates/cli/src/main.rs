//! scripts-ctest-driver - run the SCREAM scripts tests through ctest
//!
//! Resolves the machine and checkout, wipes the work dir, builds the ctest
//! line and runs it. Exit code 0: tests passed, 1: tests failed,
//! 2: the driver could not run (bad configuration, no shell, ...).
//!
//! ```bash
//! # Explicit machine, results not submitted
//! scripts-ctest-driver -m mappy
//!
//! # Machine from $CIME_MACHINE, submit to the dashboard
//! CIME_MACHINE=weaver scripts-ctest-driver --submit
//!
//! # Just show the ctest line (the work dir is still reset)
//! scripts-ctest-driver -m mappy -w /tmp/ctest-work --print-command
//! ```

mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tabled::{Table, Tabled};
use tracing::{error, info};

use logging::LogFormat;
use scream_ctest_core::port::time_provider::SystemTimeProvider;
use scream_ctest_core::port::ProcessEnvProvider;
use scream_ctest_core::{DriverDeps, DriverOptions, ExtraConfig, ScriptsCtestDriver, VERSION};
use scream_ctest_infra_system::{LocalFilesystem, MachineSpecs, ShellCommandRunner};

#[derive(Parser)]
#[command(name = "scripts-ctest-driver")]
#[command(about = "Run the SCREAM scripts tests through ctest", long_about = None)]
#[command(version)]
struct Cli {
    /// Submit results to the dashboard
    #[arg(short, long)]
    submit: bool,

    /// Machine name (default: $CIME_MACHINE, if it is a supported machine)
    #[arg(short, long)]
    machine: Option<String>,

    /// SCREAM checkout, must be $scream_repo/components/scream
    /// (default: two levels above this executable)
    #[arg(short, long)]
    root_dir: Option<String>,

    /// Scratch dir for build and test output, DELETED before each run
    /// (default: <root-dir>/ctest-build-scripts)
    #[arg(short, long)]
    work_dir: Option<String>,

    /// Resolve, reset the work dir and log the ctest line without running it
    #[arg(long)]
    dry_run: bool,

    /// Extra define forwarded to ctest as -DKEY=VALUE (repeatable, order kept)
    #[arg(short = 'D', long = "define", value_name = "KEY=VALUE", value_parser = parse_define)]
    defines: Vec<ExtraConfig>,

    /// Print the ctest line to stdout instead of running it
    #[arg(long)]
    print_command: bool,

    /// List supported machines and exit
    #[arg(long)]
    list_machines: bool,

    /// Log output format
    #[arg(long, env = "SCREAM_CTEST_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

fn parse_define(raw: &str) -> std::result::Result<ExtraConfig, String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

#[derive(Tabled)]
struct MachineRow {
    machine: String,
    description: String,
}

fn print_machines(specs: &MachineSpecs) {
    let rows: Vec<MachineRow> = specs
        .machines()
        .iter()
        .map(|m| MachineRow {
            machine: m.name.clone(),
            description: m.description.clone(),
        })
        .collect();

    println!("{}", Table::new(rows));
}

/// What the invocation ended with
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Passed,
    Failed,
    /// Only printed something (command line or machine table)
    Printed,
}

async fn run(cli: Cli) -> Result<Outcome> {
    let machine_specs = Arc::new(MachineSpecs::builtin());

    if cli.list_machines {
        print_machines(&machine_specs);
        return Ok(Outcome::Printed);
    }

    // DI wiring
    let time_provider = Arc::new(SystemTimeProvider);
    let deps = DriverDeps {
        env: Arc::new(ProcessEnvProvider),
        machine_support: machine_specs,
        filesystem: Arc::new(LocalFilesystem::new()),
        runner: Arc::new(ShellCommandRunner::new(time_provider)),
        install_path: std::env::current_exe().context("Cannot locate the driver executable")?,
    };

    let options = DriverOptions {
        submit: cli.submit,
        machine: cli.machine,
        root_dir: cli.root_dir.as_deref().map(expand_path),
        work_dir: cli.work_dir.as_deref().map(expand_path),
        dry_run: cli.dry_run,
    };

    let driver = ScriptsCtestDriver::new(options, &deps)
        .await
        .context("Failed to set up scripts-ctest-driver")?;

    if cli.print_command {
        println!("{}", driver.generate_ctest_config(&cli.defines));
        return Ok(Outcome::Printed);
    }

    let passed = driver
        .run_with(&cli.defines)
        .await
        .context("Failed to launch ctest")?;

    Ok(if passed {
        Outcome::Passed
    } else {
        Outcome::Failed
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.log_format) {
        eprintln!("{} {:#}", "warning: logging disabled:".yellow(), e);
    }

    info!("scripts-ctest-driver v{} starting...", VERSION);

    let result = run(cli).await;

    match &result {
        Ok(Outcome::Printed) => {}
        Ok(Outcome::Passed) => println!("{}", "✓ scripts tests passed".green().bold()),
        Ok(Outcome::Failed) => println!("{}", "✗ scripts tests failed".red().bold()),
        Err(e) => {
            error!(error = ?e, "Driver failed");
            eprintln!("{} {:#}", "error:".red().bold(), e);
        }
    }

    ExitCode::from(exit_status(&result))
}

/// 0: passed or only printed, 1: tests failed, 2: the driver could not run
fn exit_status(result: &Result<Outcome>) -> u8 {
    match result {
        Ok(Outcome::Printed) | Ok(Outcome::Passed) => 0,
        Ok(Outcome::Failed) => 1,
        Err(_) => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_define() {
        assert_eq!(
            parse_define("FOO=1").unwrap(),
            ("FOO".to_string(), "1".to_string())
        );
        assert_eq!(
            parse_define("EXPR=a=b").unwrap(),
            ("EXPR".to_string(), "a=b".to_string())
        );
        assert_eq!(parse_define("EMPTY=").unwrap().1, "");
        assert!(parse_define("NOVALUE").is_err());
        assert!(parse_define("=1").is_err());
    }

    #[test]
    fn test_defines_keep_order() {
        let cli = Cli::try_parse_from([
            "scripts-ctest-driver",
            "-m",
            "mappy",
            "-D",
            "FOO=1",
            "--define",
            "FOO=2",
        ])
        .unwrap();

        assert_eq!(
            cli.defines,
            vec![
                ("FOO".to_string(), "1".to_string()),
                ("FOO".to_string(), "2".to_string()),
            ]
        );
        assert_eq!(cli.machine.as_deref(), Some("mappy"));
        assert!(!cli.submit);
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::try_parse_from([
            "scripts-ctest-driver",
            "-s",
            "-r",
            "/repo/components/scream",
            "-w",
            "/tmp/w",
            "--dry-run",
        ])
        .unwrap();

        assert!(cli.submit);
        assert!(cli.dry_run);
        assert_eq!(cli.root_dir.as_deref(), Some("/repo/components/scream"));
        assert_eq!(cli.work_dir.as_deref(), Some("/tmp/w"));
    }

    #[test]
    fn test_exit_status() {
        use scream_ctest_core::port::ExecutionError;
        use scream_ctest_core::AppError;

        assert_eq!(exit_status(&Ok(Outcome::Passed)), 0);
        assert_eq!(exit_status(&Ok(Outcome::Printed)), 0);
        assert_eq!(exit_status(&Ok(Outcome::Failed)), 1);

        let config: Result<Outcome> =
            Err(AppError::Configuration("bad root-dir".to_string()).into());
        assert_eq!(exit_status(&config), 2);

        let spawn: Result<Outcome> = Err(anyhow::Error::from(AppError::from(
            ExecutionError::SpawnFailed("no shell".to_string()),
        ))
        .context("Failed to launch ctest"));
        assert_eq!(exit_status(&spawn), 2);
    }

    #[test]
    fn test_expand_path_keeps_plain_paths() {
        assert_eq!(expand_path("/tmp/w"), PathBuf::from("/tmp/w"));
        assert_eq!(expand_path("rel/w"), PathBuf::from("rel/w"));
    }
}
