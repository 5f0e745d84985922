//! Runner agent infrastructure: implements `RunnerAgent` by invoking the
//! configuration scripts shipped inside the runner archive.

use std::path::Path;
use std::process::Output;

use anyhow::Result;

use crate::application::ports::{CommandRunner, ConfigureArgs, RunnerAgent};

#[cfg(windows)]
const CONFIG_SCRIPT: &str = "config.cmd";
#[cfg(not(windows))]
const CONFIG_SCRIPT: &str = "config.sh";

/// Service installer shipped with the Linux and macOS runner.
#[cfg(not(windows))]
const SERVICE_SCRIPT: &str = "svc.sh";

/// Lets the configuration script run under a root shell.
#[cfg(not(windows))]
const SCRIPT_ENV: &[(&str, &str)] = &[("RUNNER_ALLOW_RUNASROOT", "1")];
#[cfg(windows)]
const SCRIPT_ENV: &[(&str, &str)] = &[];

/// Production `RunnerAgent` running the unit's own scripts through `R`.
pub struct RunnerScripts<R> {
    runner: R,
}

impl<R: CommandRunner> RunnerScripts<R> {
    #[must_use]
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    async fn run_script(&self, unit_dir: &Path, script: &str, args: &[String]) -> Result<Output> {
        let program = unit_dir.join(script);
        let program = program.to_string_lossy();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner
            .run_in_dir(unit_dir, &program, &args, SCRIPT_ENV)
            .await
    }
}

impl<R: CommandRunner> RunnerAgent for RunnerScripts<R> {
    async fn configure(&self, unit_dir: &Path, args: &ConfigureArgs<'_>) -> Result<Output> {
        let output = self
            .run_script(unit_dir, CONFIG_SCRIPT, &configure_args(args))
            .await?;

        #[cfg(not(windows))]
        if output.status.success() {
            return self
                .run_script(unit_dir, SERVICE_SCRIPT, &service_install_args(args))
                .await;
        }
        Ok(output)
    }

    async fn remove(&self, unit_dir: &Path, token: &str) -> Result<Output> {
        let args = vec!["remove".to_string(), "--token".to_string(), token.to_string()];
        self.run_script(unit_dir, CONFIG_SCRIPT, &args).await
    }
}

/// Flags of the unattended configuration step.
pub(crate) fn configure_args(args: &ConfigureArgs<'_>) -> Vec<String> {
    let mut out: Vec<String> = [
        "--unattended",
        "--url",
        args.url,
        "--token",
        args.token,
        "--name",
        args.name,
        "--runnergroup",
        args.runner_group,
        "--work",
        args.work_dir,
        "--labels",
        args.label,
        "--no-default-labels",
        "--replace",
        "--runasservice",
    ]
    .iter()
    .map(ToString::to_string)
    .collect();
    if let Some(identity) = args.identity {
        out.extend([
            "--windowslogonaccount".to_string(),
            identity.username.clone(),
            "--windowslogonpassword".to_string(),
            identity.password.clone(),
        ]);
    }
    out
}

/// `svc.sh install [user]`: the service runs as the configured account, or
/// as the invoking user when there is none.
#[cfg(not(windows))]
fn service_install_args(args: &ConfigureArgs<'_>) -> Vec<String> {
    let mut out = vec!["install".to_string()];
    if let Some(identity) = args.identity {
        out.push(identity.username.clone());
    }
    out
}
