// Environment Provider Port (for testability)
//
// Identity resolution reads CIME_MACHINE and the cwd through this port
// instead of the process globals, so tests never mutate the real environment.

use std::io;
use std::path::PathBuf;

/// Environment provider interface (allows mocking in tests)
pub trait EnvProvider: Send + Sync {
    /// Value of an environment variable, None if unset or not unicode
    fn var(&self, key: &str) -> Option<String>;

    /// Directory relative paths are resolved against
    fn current_dir(&self) -> io::Result<PathBuf>;
}

/// Process environment provider (production)
pub struct ProcessEnvProvider;

impl EnvProvider for ProcessEnvProvider {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn current_dir(&self) -> io::Result<PathBuf> {
        std::env::current_dir()
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;

    /// Fixed environment for tests
    pub struct MockEnvProvider {
        vars: HashMap<String, String>,
        cwd: PathBuf,
    }

    impl MockEnvProvider {
        pub fn new(cwd: impl Into<PathBuf>) -> Self {
            Self {
                vars: HashMap::new(),
                cwd: cwd.into(),
            }
        }

        pub fn with_var(mut self, key: &str, value: &str) -> Self {
            self.vars.insert(key.to_string(), value.to_string());
            self
        }
    }

    impl EnvProvider for MockEnvProvider {
        fn var(&self, key: &str) -> Option<String> {
            self.vars.get(key).cloned()
        }

        fn current_dir(&self) -> io::Result<PathBuf> {
            Ok(self.cwd.clone())
        }
    }
}
