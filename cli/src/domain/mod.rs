//! Domain layer: pure fleet types, naming, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod service;
pub mod summary;
pub mod unit;

pub use config::{FleetConfig, Identity, ServiceAccount};
pub use error::{ArtifactError, ConfigError, FleetError, TokenError, UnitError};
pub use service::{ServiceHandle, ServiceStatus};
pub use summary::{BatchSummary, UnitReport, UnitStatus};
pub use unit::RunnerUnit;
