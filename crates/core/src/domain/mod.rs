// Domain Layer - driver state and the ctest invocation model

pub mod ctest_command;
pub mod machine;
pub mod options;

// Re-exports
pub use ctest_command::CtestCommand;
pub use machine::MachineName;
pub use options::{DriverOptions, ExtraConfig};
