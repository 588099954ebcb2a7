// Port Layer - Interfaces for external dependencies

pub mod command_runner;
pub mod env_provider;
pub mod filesystem;
pub mod machine_support;
pub mod time_provider; // For duration reporting

// Re-exports
pub use command_runner::{
    CommandRequest, CommandRunner, ExecutionError, ExecutionResult, ExecutionStatus,
};
pub use env_provider::{EnvProvider, ProcessEnvProvider};
pub use filesystem::{EntryKind, Filesystem};
pub use machine_support::MachineSupport;
pub use time_provider::TimeProvider;
