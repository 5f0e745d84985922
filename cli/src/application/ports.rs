//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::domain::{
    ArtifactError, FleetConfig, Identity, ServiceHandle, ServiceStatus, TokenError,
};

// ── Token Port ────────────────────────────────────────────────────────────────

/// Issues short-lived runner tokens from the CI orchestration API.
///
/// No retries: every failure is returned to the caller as-is.
#[allow(async_fn_in_trait)]
pub trait TokenBroker {
    /// Request a token that lets a new runner register with `org`.
    async fn request_registration_token(
        &self,
        org: &str,
        credential: &str,
    ) -> Result<String, TokenError>;

    /// Request a token that lets a runner deregister from `org`.
    async fn request_removal_token(&self, org: &str, credential: &str)
    -> Result<String, TokenError>;
}

// ── Artifact Port ─────────────────────────────────────────────────────────────

/// Download, validation, and extraction of the runner archive.
#[allow(async_fn_in_trait)]
pub trait ArtifactStore {
    /// Download `url` to `dest`, replacing it only once the transfer completes.
    async fn download(&self, url: &str, dest: &Path) -> Result<(), ArtifactError>;

    /// Check that `path` is a complete archive, and matches `expected_sha256`
    /// when one is given.
    fn validate(&self, path: &Path, expected_sha256: Option<&str>) -> Result<(), ArtifactError>;

    /// Unpack `archive` into `dest`.
    fn extract(&self, archive: &Path, dest: &Path) -> Result<(), ArtifactError>;
}

// ── Runner Agent Port ─────────────────────────────────────────────────────────

/// Parameters of the runner's unattended configuration step.
pub struct ConfigureArgs<'a> {
    /// Registration URL, e.g. `https://github.com/acme`.
    pub url: &'a str,
    /// Shared registration token of the current run.
    pub token: &'a str,
    /// Unit name the runner registers as.
    pub name: &'a str,
    pub runner_group: &'a str,
    /// Work directory name relative to the unit directory.
    pub work_dir: &'a str,
    /// Sole label, replacing the default labels.
    pub label: &'a str,
    /// Service account, or `None` for the invoking context.
    pub identity: Option<&'a Identity>,
}

/// The runner agent's own configuration executable inside a unit directory.
#[allow(async_fn_in_trait)]
pub trait RunnerAgent {
    /// Register the runner and install it as a service.
    ///
    /// Returns the output of the last step run; a non-zero exit means the
    /// unit is not configured.
    async fn configure(&self, unit_dir: &Path, args: &ConfigureArgs<'_>) -> Result<Output>;

    /// Deregister the runner using a removal token.
    async fn remove(&self, unit_dir: &Path, token: &str) -> Result<Output>;
}

// ── Service Manager Port ──────────────────────────────────────────────────────

/// OS service manager operations on named services.
#[allow(async_fn_in_trait)]
pub trait ServiceManager {
    /// Look up the single service whose name matches `pattern` (`*` wildcard).
    ///
    /// Returns `Ok(None)` when nothing matches. More than one match is an error.
    async fn find(&self, pattern: &str) -> Result<Option<ServiceHandle>>;
    async fn status(&self, service: &ServiceHandle) -> Result<ServiceStatus>;
    async fn start(&self, service: &ServiceHandle) -> Result<()>;
    async fn stop(&self, service: &ServiceHandle) -> Result<()>;
    /// Remove the service registration.
    async fn delete(&self, service: &ServiceHandle) -> Result<()>;
}

// ── Credential Port ───────────────────────────────────────────────────────────

/// Supplies the secret of a service account configured without one.
pub trait CredentialProvider {
    /// Resolve the full identity of service account `username`.
    fn resolve_service_identity(&self, username: &str) -> Result<Identity>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
    /// Run a program from `dir` with extra environment variables and no
    /// timeout; it runs to completion.
    async fn run_in_dir(
        &self,
        dir: &Path,
        program: &str,
        args: &[&str],
        envs: &[(&str, &str)],
    ) -> Result<Output>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
    /// Emit an error message. Never suppressed.
    fn error(&self, message: &str);
}

// ── Filesystem Port ───────────────────────────────────────────────────────────

/// Raw filesystem operations on unit directories and the shared archive.
pub trait LocalFs {
    fn exists(&self, path: &Path) -> bool;
    /// Create `path` and its parents; succeeds if it already exists.
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn remove_dir_all(&self, path: &Path) -> Result<()>;
    fn remove_file(&self, path: &Path) -> Result<()>;
    fn copy(&self, from: &Path, to: &Path) -> Result<()>;
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Loads the fleet configuration.
pub trait ConfigStore {
    /// Load and validate the configuration.
    fn load(&self) -> Result<FleetConfig>;
    /// Path the configuration is read from.
    fn path(&self) -> Result<PathBuf>;
}

// ── Port bundle ───────────────────────────────────────────────────────────────

/// The ports one fleet run needs, borrowed for the duration of the run.
pub struct FleetPorts<'a, B, A, F, G, S, C, R> {
    pub tokens: &'a B,
    pub artifacts: &'a A,
    pub fs: &'a F,
    pub agent: &'a G,
    pub services: &'a S,
    pub credentials: &'a C,
    pub reporter: &'a R,
}
