//! OS service handles and wildcard name matching.

use std::fmt;

use regex::Regex;

/// A named OS service registration bound to a runner unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceHandle {
    pub name: String,
}

impl ServiceHandle {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for ServiceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Coarse run state of a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceStatus {
    Running,
    Stopped,
    /// Transitional or unrecognized state, as reported by the service manager.
    Other(String),
}

impl ServiceStatus {
    /// Map a systemd `ActiveState` value.
    #[must_use]
    pub fn from_active_state(state: &str) -> Self {
        match state.trim() {
            "active" | "reloading" => Self::Running,
            "inactive" | "failed" => Self::Stopped,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => f.write_str("running"),
            Self::Stopped => f.write_str("stopped"),
            Self::Other(state) => f.write_str(state),
        }
    }
}

/// Returns `true` if `name` matches the `*` wildcard `pattern` in full.
#[must_use]
pub fn matches_pattern(pattern: &str, name: &str) -> bool {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{body}$")).is_ok_and(|re| re.is_match(name))
}
