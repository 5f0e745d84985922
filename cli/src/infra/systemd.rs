//! systemd infrastructure: implements `ServiceManager` by shelling out to
//! `systemctl` through a `CommandRunner`.

use std::process::Output;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, ServiceManager};
use crate::domain::service::matches_pattern;
use crate::domain::{ServiceHandle, ServiceStatus};

const SYSTEMCTL: &str = "systemctl";

/// Production `ServiceManager` for systemd hosts.
pub struct SystemdServiceManager<R> {
    runner: R,
}

impl<R: CommandRunner> SystemdServiceManager<R> {
    #[must_use]
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    async fn systemctl(&self, args: &[&str]) -> Result<Output> {
        self.runner.run(SYSTEMCTL, args).await
    }

    /// Run a control verb and fail on a non-zero exit.
    async fn control(&self, verb: &str, service: &ServiceHandle) -> Result<()> {
        let output = self.systemctl(&[verb, &service.name]).await?;
        if !output.status.success() {
            anyhow::bail!(
                "systemctl {verb} {service} failed: {}",
                stderr_or_code(&output)
            );
        }
        Ok(())
    }
}

impl<R: CommandRunner> ServiceManager for SystemdServiceManager<R> {
    async fn find(&self, pattern: &str) -> Result<Option<ServiceHandle>> {
        let output = self
            .systemctl(&[
                "list-unit-files",
                "--type=service",
                "--no-legend",
                "--plain",
                pattern,
            ])
            .await?;
        let matches = parse_unit_files(&String::from_utf8_lossy(&output.stdout), pattern);
        // Newer systemd exits non-zero when nothing matches; only stderr
        // output marks a real failure.
        if matches.is_empty()
            && !output.status.success()
            && !String::from_utf8_lossy(&output.stderr).trim().is_empty()
        {
            anyhow::bail!(
                "systemctl list-unit-files {pattern} failed: {}",
                stderr_or_code(&output)
            );
        }
        match matches.as_slice() {
            [] => Ok(None),
            [single] => Ok(Some(ServiceHandle::new(single.clone()))),
            many => anyhow::bail!(
                "{} services match {pattern}: {}",
                many.len(),
                many.join(", ")
            ),
        }
    }

    async fn status(&self, service: &ServiceHandle) -> Result<ServiceStatus> {
        // `is-active` exits non-zero for any state but active; the state is
        // always printed on stdout.
        let output = self.systemctl(&["is-active", &service.name]).await?;
        let state = String::from_utf8_lossy(&output.stdout);
        let state = state.trim();
        if state.is_empty() {
            anyhow::bail!(
                "systemctl is-active {service} failed: {}",
                stderr_or_code(&output)
            );
        }
        Ok(ServiceStatus::from_active_state(state))
    }

    async fn start(&self, service: &ServiceHandle) -> Result<()> {
        self.control("start", service).await
    }

    async fn stop(&self, service: &ServiceHandle) -> Result<()> {
        self.control("stop", service).await
    }

    async fn delete(&self, service: &ServiceHandle) -> Result<()> {
        self.control("disable", service).await?;

        let output = self
            .systemctl(&["show", "-p", "FragmentPath", "--value", &service.name])
            .await?;
        let fragment = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !fragment.is_empty() && std::path::Path::new(&fragment).exists() {
            std::fs::remove_file(&fragment)
                .with_context(|| format!("removing unit file {fragment}"))?;
        }

        let output = self.systemctl(&["daemon-reload"]).await?;
        if !output.status.success() {
            anyhow::bail!("systemctl daemon-reload failed: {}", stderr_or_code(&output));
        }
        // Clears a lingering failed state; nothing to do if there is none.
        let _ = self.systemctl(&["reset-failed", &service.name]).await;
        Ok(())
    }
}

/// Service names from `list-unit-files --no-legend --plain` output that
/// match `pattern`.
pub(crate) fn parse_unit_files(stdout: &str, pattern: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .filter(|name| matches_pattern(pattern, name))
        .map(str::to_string)
        .collect()
}

fn stderr_or_code(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        output
            .status
            .code()
            .map_or_else(|| "killed by signal".to_string(), |c| format!("exit code {c}"))
    } else {
        stderr.to_string()
    }
}
