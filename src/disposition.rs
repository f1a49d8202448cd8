//! Disposition of a classified rule line.

use std::fmt;

/// What a single rule line means for the domain it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Disposition {
    /// Comment, blank line or unsupported syntax
    #[default]
    Ignored,
    /// The domain should be denied resolution
    Blocked,
    /// The domain is an exception to blocking
    Allowed,
}

impl Disposition {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Ignored => "IGNORED",
            Disposition::Blocked => "BLOCKED",
            Disposition::Allowed => "ALLOWED",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
