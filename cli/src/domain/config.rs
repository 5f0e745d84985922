//! Domain types and validators for the fleet configuration.
//!
//! Pure functions only, no I/O.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;
use crate::domain::unit::RunnerUnit;

// ── Constants ────────────────────────────────────────────────────────────────

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "RUNNER_FLEET_CONFIG";

/// Environment variable consulted when `access_token` is empty.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

// ── Config schema ────────────────────────────────────────────────────────────

/// Fleet configuration, loaded once per invocation and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    /// GitHub organization the runners register with.
    pub organization: String,

    /// Web base URL, used to build the runner registration URL.
    #[serde(default = "default_github_url")]
    pub github_url: String,

    /// REST API base URL, used for token requests.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Access credential for the token endpoints (falls back to `GITHUB_TOKEN`).
    #[serde(default)]
    pub access_token: String,

    /// Runner agent version, e.g. `2.321.0`.
    pub agent_version: String,

    /// Number of runner units to provision or tear down.
    pub runner_count: u32,

    /// Directory holding the shared archive and one directory per unit.
    pub base_dir: PathBuf,

    /// Runner group the units join.
    #[serde(default = "default_runner_group")]
    pub runner_group: String,

    /// Optional account the runner services run as.
    #[serde(default)]
    pub service_account: Option<ServiceAccount>,

    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,

    /// Sole label applied to every unit (default labels are disabled).
    #[serde(default = "default_label")]
    pub label: String,

    /// Work directory name inside each unit.
    #[serde(default = "default_work_dir")]
    pub work_dir: String,

    /// Delay before looking up a freshly registered service.
    #[serde(default = "default_lookup_delay_secs")]
    pub service_lookup_delay_secs: u64,

    /// Expected SHA-256 of the runner archive, checked when present.
    #[serde(default)]
    pub artifact_sha256: Option<String>,

    /// Runner archive platform, e.g. `linux-x64`.
    #[serde(default = "default_platform")]
    pub platform: String,
}

/// Account configured to run the runner services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceAccount {
    pub username: String,
    /// Left empty to be prompted at `init` time.
    #[serde(default)]
    pub password: String,
}

/// Resolved credentials a runner service runs under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub password: String,
}

fn default_github_url() -> String {
    "https://github.com".to_string()
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_runner_group() -> String {
    "Default".to_string()
}

fn default_name_prefix() -> String {
    "runner-".to_string()
}

fn default_label() -> String {
    "self-hosted-fleet".to_string()
}

fn default_work_dir() -> String {
    "_work".to_string()
}

fn default_lookup_delay_secs() -> u64 {
    3
}

/// Runner archive platform for the host this binary was built for.
#[must_use]
pub fn default_platform() -> String {
    let platform = match (std::env::consts::OS, std::env::consts::ARCH) {
        ("linux", "aarch64") => "linux-arm64",
        ("linux", "arm") => "linux-arm",
        ("macos", "x86_64") => "osx-x64",
        ("macos", "aarch64") => "osx-arm64",
        ("windows", "x86_64") => "win-x64",
        ("windows", "aarch64") => "win-arm64",
        _ => "linux-x64",
    };
    platform.to_string()
}

// ── Derived values ───────────────────────────────────────────────────────────

impl FleetConfig {
    /// Fill an empty `access_token` from the environment value, if any.
    #[must_use]
    pub fn with_env_token(mut self, env_token: Option<String>) -> Self {
        if self.access_token.trim().is_empty() {
            if let Some(token) = env_token.filter(|t| !t.trim().is_empty()) {
                self.access_token = token;
            }
        }
        self
    }

    /// URL the runners register against, e.g. `https://github.com/acme`.
    #[must_use]
    pub fn runner_url(&self) -> String {
        format!("{}/{}", self.github_url.trim_end_matches('/'), self.organization)
    }

    /// File name of the runner archive for this version and platform.
    #[must_use]
    pub fn artifact_name(&self) -> String {
        format!(
            "actions-runner-{}-{}.tar.gz",
            self.platform, self.agent_version
        )
    }

    /// Shared archive location, `<base_dir>/<artifact_name>`.
    #[must_use]
    pub fn artifact_path(&self) -> PathBuf {
        self.base_dir.join(self.artifact_name())
    }

    /// Release download URL of the runner archive.
    #[must_use]
    pub fn artifact_url(&self) -> String {
        format!(
            "{}/actions/runner/releases/download/v{}/{}",
            self.github_url.trim_end_matches('/'),
            self.agent_version,
            self.artifact_name()
        )
    }

    #[must_use]
    pub fn service_lookup_delay(&self) -> Duration {
        Duration::from_secs(self.service_lookup_delay_secs)
    }

    /// All runner units of the fleet, ordinals `1..=runner_count`.
    pub fn units(&self) -> impl Iterator<Item = RunnerUnit> + '_ {
        (1..=self.runner_count).map(|i| RunnerUnit::new(i, &self.name_prefix, &self.base_dir))
    }

    /// Validate values that cannot be expressed in the schema.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty("organization", &self.organization)?;
        if self.organization.contains('/') {
            return Err(invalid("organization", "must be an organization login, not a path"));
        }
        require_non_empty("agent_version", &self.agent_version)?;
        require_non_empty("access_token", &self.access_token)?;
        require_non_empty("name_prefix", &self.name_prefix)?;
        require_non_empty("label", &self.label)?;
        require_non_empty("work_dir", &self.work_dir)?;
        if self.runner_count == 0 {
            return Err(invalid("runner_count", "must be at least 1"));
        }
        if self.base_dir.as_os_str().is_empty() {
            return Err(invalid("base_dir", "must not be empty"));
        }
        if let Some(digest) = &self.artifact_sha256 {
            if !is_sha256_hex(digest) {
                return Err(invalid("artifact_sha256", "must be 64 hex characters"));
            }
        }
        if let Some(account) = &self.service_account {
            require_non_empty("service_account.username", &account.username)?;
        }
        Ok(())
    }
}

fn require_non_empty(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(invalid(field, "must not be empty"));
    }
    Ok(())
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
}

fn is_sha256_hex(value: &str) -> bool {
    value.len() == 64 && value.chars().all(|c| c.is_ascii_hexdigit())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
