//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, filesystem
//! access, HTTP calls to GitHub, archive handling, the runner's own scripts,
//! and systemd.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod agent;
pub mod artifacts;
pub mod command_runner;
pub mod config;
pub mod credentials;
pub mod fs;
pub mod github;
pub mod systemd;
