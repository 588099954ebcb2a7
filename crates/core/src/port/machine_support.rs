// Machine support port
// Answers "is this a machine the test suite knows how to run on"

/// Support predicate consulted only for the CIME_MACHINE fallback
pub trait MachineSupport: Send + Sync {
    fn is_supported(&self, name: &str) -> bool;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashSet;

    /// Allowlist-backed support predicate
    pub struct MockMachineSupport {
        supported: HashSet<String>,
    }

    impl MockMachineSupport {
        pub fn new(supported: &[&str]) -> Self {
            Self {
                supported: supported.iter().map(|s| s.to_string()).collect(),
            }
        }

        /// Supports nothing
        pub fn none() -> Self {
            Self::new(&[])
        }
    }

    impl MachineSupport for MockMachineSupport {
        fn is_supported(&self, name: &str) -> bool {
            self.supported.contains(name)
        }
    }
}
