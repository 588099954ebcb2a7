// SCREAM scripts-ctest Core - Domain Logic & Ports
// NO infrastructure dependencies: processes, filesystem and environment sit behind ports

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use application::{DriverDeps, ScriptsCtestDriver};
pub use domain::{CtestCommand, DriverOptions, ExtraConfig, MachineName};
pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
