// SCREAM scripts-ctest Infrastructure - System Adapters
// Implements: CommandRunner, Filesystem, MachineSupport

pub mod local_filesystem;
pub mod machine_specs;
pub mod shell_runner;

pub use local_filesystem::LocalFilesystem;
pub use machine_specs::{MachineSpec, MachineSpecs};
pub use shell_runner::ShellCommandRunner;
