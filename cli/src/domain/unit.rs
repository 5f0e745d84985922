//! Runner units and their derived names.

use std::path::{Path, PathBuf};

/// Service name prefix the runner's service installer uses.
pub const SERVICE_PREFIX: &str = "actions.runner.*.";

/// Service name suffix the runner's service installer uses.
pub const SERVICE_SUFFIX: &str = ".service";

/// One runner slot of the fleet, identified by its ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerUnit {
    /// Ordinal in `1..=runner_count`.
    pub index: u32,
    /// `name_prefix + index`.
    pub name: String,
    /// `base_dir/name`.
    pub dir: PathBuf,
}

impl RunnerUnit {
    #[must_use]
    pub fn new(index: u32, prefix: &str, base_dir: &Path) -> Self {
        let name = format!("{prefix}{index}");
        let dir = base_dir.join(&name);
        Self { index, name, dir }
    }

    /// Wildcard pattern matching the OS service registered for this unit.
    ///
    /// The installer names services `actions.runner.<scope>.<name>.service`,
    /// where the scope depends on the registration URL.
    #[must_use]
    pub fn service_pattern(&self) -> String {
        format!("{SERVICE_PREFIX}{}{SERVICE_SUFFIX}", self.name)
    }
}
