//! Host platform detection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The operating-system family the run executes on.
///
/// Resolved once from the host and injected wherever behavior differs,
/// so tests can exercise both branches on any machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// The Windows family.
    Windows,
    /// Everything else (Linux, macOS, BSDs).
    Unix,
}

impl Platform {
    /// Returns the platform of the running process.
    #[must_use]
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    /// Returns true for the Windows family.
    #[must_use]
    pub fn is_windows(self) -> bool {
        matches!(self, Self::Windows)
    }

    /// Suffix appended to executable file names.
    #[must_use]
    pub fn executable_suffix(self) -> &'static str {
        match self {
            Self::Windows => ".exe",
            Self::Unix => "",
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Windows => write!(f, "windows"),
            Self::Unix => write!(f, "unix"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_matches_cfg() {
        assert_eq!(Platform::current().is_windows(), cfg!(windows));
    }

    #[test]
    fn test_executable_suffix() {
        assert_eq!(Platform::Windows.executable_suffix(), ".exe");
        assert_eq!(Platform::Unix.executable_suffix(), "");
    }
}
