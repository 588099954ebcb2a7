// Application Layer - resolution, workspace lifecycle, command synthesis

pub mod constants;
pub mod driver;
pub mod resolution;
pub mod workspace;

// Re-exports
pub use driver::{DriverDeps, ScriptsCtestDriver};
pub use workspace::reset_workspace;
