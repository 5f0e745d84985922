//! Shared test helpers: exit statuses, outputs, archives, and configs.

#![allow(dead_code)]

use std::path::Path;
use std::process::{ExitStatus, Output};

use flate2::Compression;
use flate2::write::GzEncoder;
use runner_fleet::domain::FleetConfig;

// ── Cross-platform ExitStatus construction ───────────────────────────────────

/// Build an `ExitStatus` from a logical exit code (0 = success, non-zero = failure).
///
/// On Unix the raw wait-status encodes the exit code in bits 8–15, so we shift.
/// On Windows `ExitStatusExt::from_raw` takes the exit code directly.
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    ExitStatus::from_raw(code as u32)
}

// ── Output constructors ──────────────────────────────────────────────────────

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn err_output(code: i32, stderr: &[u8]) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

// ── Runner archives ──────────────────────────────────────────────────────────

/// A small but complete runner archive: the scripts the fleet invokes plus
/// one nested binary.
pub fn runner_archive() -> Vec<u8> {
    archive_of(&[
        ("config.sh", b"#!/bin/sh\nexit 0\n".as_slice()),
        ("svc.sh", b"#!/bin/sh\nexit 0\n".as_slice()),
        ("bin/Runner.Listener", b"\x7fELF".as_slice()),
    ])
}

/// A gzip-compressed tar holding `files`.
pub fn archive_of(files: &[(&str, &[u8])]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, data) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(&mut header, name, *data)
            .expect("append entry");
    }
    builder
        .into_inner()
        .expect("finish tar")
        .finish()
        .expect("finish gzip")
}

/// Bytes that look nothing like an archive, e.g. an HTML error page.
pub const GARBAGE: &[u8] = b"<html><body>502 Bad Gateway</body></html>";

// ── Configs ──────────────────────────────────────────────────────────────────

/// A valid config for `count` units under `base_dir`, with no lookup delay.
pub fn fleet_config(base_dir: &Path, count: u32) -> FleetConfig {
    let yaml = format!(
        "organization: acme\n\
         access_token: ghp_test_secret\n\
         agent_version: 2.321.0\n\
         runner_count: {count}\n\
         base_dir: {}\n\
         service_lookup_delay_secs: 0\n\
         platform: linux-x64\n",
        base_dir.display()
    );
    serde_yaml::from_str(&yaml).expect("valid test config")
}
