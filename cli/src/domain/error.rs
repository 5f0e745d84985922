//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::path::PathBuf;

use thiserror::Error;

// ── Token errors ──────────────────────────────────────────────────────────────

/// Failures while requesting a registration or removal token.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("GitHub rejected the access token (HTTP 401). Check access_token or GITHUB_TOKEN.")]
    Auth,

    #[error(
        "Access token may not manage runners for '{org}' (HTTP 403). The token needs the admin:org scope."
    )]
    Authorization { org: String },

    #[error("Organization '{org}' not found at {url} (HTTP 404).")]
    NotFound { org: String, url: String },

    #[error("Token request failed: {0}")]
    Transient(String),

    #[error("Unexpected token response: {0}")]
    Protocol(String),
}

// ── Artifact errors ───────────────────────────────────────────────────────────

/// Failures while downloading, validating, or unpacking the runner archive.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Cannot download {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("{} is not a valid runner archive: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },

    #[error("Cannot remove {}: {reason}", path.display())]
    Cleanup { path: PathBuf, reason: String },

    #[error("Cannot extract {}: {reason}", path.display())]
    Extract { path: PathBuf, reason: String },
}

// ── Unit errors ───────────────────────────────────────────────────────────────

/// Failures scoped to a single runner unit. Never abort the batch.
#[derive(Debug, Error)]
pub enum UnitError {
    #[error("{unit}: cannot prepare {}: {reason}", dir.display())]
    Workspace {
        unit: String,
        dir: PathBuf,
        reason: String,
    },

    #[error("{unit}: {source}")]
    Extract {
        unit: String,
        #[source]
        source: ArtifactError,
    },

    #[error("{unit}: runner configuration failed ({}): {detail}", exit_display(*code))]
    Configure {
        unit: String,
        code: Option<i32>,
        detail: String,
    },

    #[error("{unit}: service {service}: {reason}")]
    Service {
        unit: String,
        service: String,
        reason: String,
    },

    #[error("{unit}: deregistration failed, remove it manually on GitHub: {reason}")]
    Deregister { unit: String, reason: String },

    #[error("{unit}: cannot delete {}: {reason}", dir.display())]
    RemoveDir {
        unit: String,
        dir: PathBuf,
        reason: String,
    },
}

fn exit_display(code: Option<i32>) -> String {
    code.map_or_else(|| "no exit code".to_string(), |c| format!("exit {c}"))
}

// ── Fleet errors ──────────────────────────────────────────────────────────────

/// Batch-wide failures that abort `init` or `destroy` before any unit runs.
#[derive(Debug, Error)]
pub enum FleetError {
    #[error("Base directory {} does not exist. Nothing to destroy.", .0.display())]
    BaseDirMissing(PathBuf),

    #[error("Cannot resolve service account '{username}': {reason}")]
    Identity { username: String, reason: String },
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to loading and validating the fleet configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file {} not found. Set RUNNER_FLEET_CONFIG or create it.", .0.display())]
    NotFound(PathBuf),

    #[error("Cannot parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
