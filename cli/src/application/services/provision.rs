//! Application service: provisioning of a single runner unit.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! Every failure here is scoped to one unit; callers keep going.

use std::path::Path;

use crate::application::ports::{
    ArtifactStore, ConfigureArgs, CredentialProvider, FleetPorts, LocalFs, ProgressReporter,
    RunnerAgent, ServiceManager, TokenBroker,
};
use crate::domain::{
    FleetConfig, FleetError, Identity, RunnerUnit, ServiceAccount, ServiceHandle, ServiceStatus,
    UnitError,
};

/// Batch-wide inputs shared by every unit of one `init` run.
pub struct ProvisionRun<'a> {
    /// Registration token, requested once per run.
    pub token: &'a str,
    /// Identity the services run as, `None` for the invoking context.
    pub identity: Option<&'a Identity>,
    /// Validated shared archive.
    pub artifact: &'a Path,
}

/// Outcome of a unit that was configured successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    /// Service found and started.
    Started {
        service: ServiceHandle,
        status: ServiceStatus,
    },
    /// Runner registered, but no service matched after the lookup delay.
    NotStarted,
}

/// Resolve the identity the runner services run under.
///
/// A configured account with an empty password asks `credentials` for the
/// secret. Without an account the services run under the invoking context.
///
/// # Errors
///
/// Returns [`FleetError::Identity`] if the credential provider fails.
pub fn resolve_identity(
    account: Option<&ServiceAccount>,
    credentials: &impl CredentialProvider,
) -> Result<Option<Identity>, FleetError> {
    let Some(account) = account else {
        return Ok(None);
    };
    if !account.password.is_empty() {
        return Ok(Some(Identity {
            username: account.username.clone(),
            password: account.password.clone(),
        }));
    }
    credentials
        .resolve_service_identity(&account.username)
        .map(Some)
        .map_err(|e| FleetError::Identity {
            username: account.username.clone(),
            reason: format!("{e:#}"),
        })
}

/// Provision one runner unit: directory, archive, registration, service.
///
/// Partial state is left in place on failure for inspection; nothing is
/// rolled back.
///
/// # Errors
///
/// Returns a [`UnitError`] naming the step that failed.
pub async fn provision_unit(
    unit: &RunnerUnit,
    config: &FleetConfig,
    run: &ProvisionRun<'_>,
    ports: &FleetPorts<
        '_,
        impl TokenBroker,
        impl ArtifactStore,
        impl LocalFs,
        impl RunnerAgent,
        impl ServiceManager,
        impl CredentialProvider,
        impl ProgressReporter,
    >,
) -> Result<UnitOutcome, UnitError> {
    let reporter = ports.reporter;

    // Step 1: working directory.
    reporter.step(&format!("{}: preparing {}", unit.name, unit.dir.display()));
    ports
        .fs
        .create_dir_all(&unit.dir)
        .map_err(|e| workspace_error(unit, &e))?;

    // Step 2: copy and unpack the archive.
    let archive_name = run
        .artifact
        .file_name()
        .map_or_else(|| "actions-runner.tar.gz".into(), |n| n.to_os_string());
    let local_archive = unit.dir.join(archive_name);
    ports
        .fs
        .copy(run.artifact, &local_archive)
        .map_err(|e| workspace_error(unit, &e))?;
    ports
        .artifacts
        .extract(&local_archive, &unit.dir)
        .map_err(|source| UnitError::Extract {
            unit: unit.name.clone(),
            source,
        })?;
    if let Err(e) = ports.fs.remove_file(&local_archive) {
        reporter.warn(&format!("{}: {e:#}", unit.name));
    }

    // Step 3: register and install the service.
    reporter.step(&format!("{}: registering with {}", unit.name, config.runner_url()));
    let url = config.runner_url();
    let args = ConfigureArgs {
        url: &url,
        token: run.token,
        name: &unit.name,
        runner_group: &config.runner_group,
        work_dir: &config.work_dir,
        label: &config.label,
        identity: run.identity,
    };
    let output = ports
        .agent
        .configure(&unit.dir, &args)
        .await
        .map_err(|e| UnitError::Configure {
            unit: unit.name.clone(),
            code: None,
            detail: format!("{e:#}"),
        })?;
    if !output.status.success() {
        return Err(UnitError::Configure {
            unit: unit.name.clone(),
            code: output.status.code(),
            detail: failure_detail(&output),
        });
    }

    // Step 4: locate and start the service.
    tokio::time::sleep(config.service_lookup_delay()).await;
    let pattern = unit.service_pattern();
    let service = match ports.services.find(&pattern).await {
        Ok(Some(service)) => service,
        Ok(None) => {
            reporter.warn(&format!(
                "{}: no service matching {pattern}; runner registered but not started",
                unit.name
            ));
            return Ok(UnitOutcome::NotStarted);
        }
        Err(e) => return Err(service_error(unit, &pattern, &e)),
    };
    ports
        .services
        .start(&service)
        .await
        .map_err(|e| service_error(unit, &service.name, &e))?;
    let status = ports
        .services
        .status(&service)
        .await
        .map_err(|e| service_error(unit, &service.name, &e))?;

    reporter.success(&format!("{}: service {service} is {status}", unit.name));
    Ok(UnitOutcome::Started { service, status })
}

fn workspace_error(unit: &RunnerUnit, e: &anyhow::Error) -> UnitError {
    UnitError::Workspace {
        unit: unit.name.clone(),
        dir: unit.dir.clone(),
        reason: format!("{e:#}"),
    }
}

fn service_error(unit: &RunnerUnit, service: &str, e: &anyhow::Error) -> UnitError {
    UnitError::Service {
        unit: unit.name.clone(),
        service: service.to_string(),
        reason: format!("{e:#}"),
    }
}

/// Last non-empty stderr line, falling back to stdout.
pub(crate) fn failure_detail(output: &std::process::Output) -> String {
    let last_line = |bytes: &[u8]| {
        String::from_utf8_lossy(bytes)
            .lines()
            .map(str::trim)
            .rev()
            .find(|l| !l.is_empty())
            .map(str::to_string)
    };
    last_line(&output.stderr)
        .or_else(|| last_line(&output.stdout))
        .unwrap_or_else(|| "no output".to_string())
}
