// Machine identity

use std::fmt;

/// Canonical machine identifier handed to CIME through `CIME_MACHINE`
///
/// Stored verbatim: no trimming, no case folding, no support check.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MachineName(String);

impl MachineName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MachineName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MachineName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for MachineName {
    fn from(name: String) -> Self {
        Self(name)
    }
}
