// Caller-supplied driver options

use std::path::PathBuf;

/// Extra `-D<key>=<value>` define forwarded verbatim to ctest
pub type ExtraConfig = (String, String);

/// Construction parameters for [`crate::ScriptsCtestDriver`]
///
/// Every `None` is resolved during construction; explicit values always win.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverOptions {
    /// Upload results to the dashboard. When false ctest gets `-DNO_SUBMIT=True`
    pub submit: bool,
    /// Explicit machine, trusted without a support check
    pub machine: Option<String>,
    /// Must be `<repo>/components/scream` when supplied
    pub root_dir: Option<PathBuf>,
    /// Scratch dir, wiped on construction
    pub work_dir: Option<PathBuf>,
    /// Synthesize and log the command, but never launch it
    pub dry_run: bool,
}

impl DriverOptions {
    pub fn with_machine(mut self, machine: impl Into<String>) -> Self {
        self.machine = Some(machine.into());
        self
    }

    pub fn with_root_dir(mut self, root_dir: impl Into<PathBuf>) -> Self {
        self.root_dir = Some(root_dir.into());
        self
    }

    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(work_dir.into());
        self
    }

    pub fn with_submit(mut self, submit: bool) -> Self {
        self.submit = submit;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}
