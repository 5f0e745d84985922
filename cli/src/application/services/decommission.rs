//! Application service: best-effort teardown of a single runner unit.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//!
//! Teardown is two-tiered. The service manager path stops and deletes the
//! OS service. If that path errors, the runner is deregistered through the
//! agent's `remove` step with a fresh removal token so the remote side
//! does not keep a dead runner. The unit directory is deleted either way.

use anyhow::Result;

use crate::application::ports::{
    ArtifactStore, CredentialProvider, FleetPorts, LocalFs, ProgressReporter, RunnerAgent,
    ServiceManager, TokenBroker,
};
use crate::application::services::provision::failure_detail;
use crate::domain::{FleetConfig, RunnerUnit, ServiceHandle, ServiceStatus, UnitError};

/// What happened to a unit during `destroy`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecommissionOutcome {
    /// The unit directory did not exist.
    Skipped,
    /// The service was stopped (unless already stopped) and deleted.
    ServiceRemoved { service: ServiceHandle },
    /// No service matched; only the directory was removed.
    NoService,
    /// The service manager path failed; the runner was deregistered instead.
    Deregistered,
}

/// Tear down one runner unit.
///
/// Never stops at the first failure: the directory is always deleted after
/// the service cleanup, whatever its result.
///
/// # Errors
///
/// Returns a [`UnitError`] if the fallback deregistration failed (the unit
/// may still be registered remotely) or the directory could not be deleted.
pub async fn decommission_unit(
    unit: &RunnerUnit,
    config: &FleetConfig,
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
) -> Result<DecommissionOutcome, UnitError> {
    let reporter = ports.reporter;

    if !ports.fs.exists(&unit.dir) {
        reporter.step(&format!("{}: {} not found, skipping", unit.name, unit.dir.display()));
        return Ok(DecommissionOutcome::Skipped);
    }

    let mut failure = None;
    let outcome = match remove_service(unit, ports.services).await {
        Ok(Some(service)) => {
            reporter.success(&format!("{}: service {service} removed", unit.name));
            DecommissionOutcome::ServiceRemoved { service }
        }
        Ok(None) => {
            reporter.warn(&format!(
                "{}: no service matching {}",
                unit.name,
                unit.service_pattern()
            ));
            DecommissionOutcome::NoService
        }
        Err(e) => {
            reporter.warn(&format!(
                "{}: service cleanup failed ({e:#}); deregistering with a removal token",
                unit.name
            ));
            match deregister(unit, config, ports).await {
                Ok(()) => {
                    reporter.success(&format!("{}: deregistered from GitHub", unit.name));
                }
                Err(err) => {
                    reporter.error(&err.to_string());
                    failure = Some(err);
                }
            }
            DecommissionOutcome::Deregistered
        }
    };

    match ports.fs.remove_dir_all(&unit.dir) {
        Ok(()) => reporter.success(&format!("{}: deleted {}", unit.name, unit.dir.display())),
        Err(e) => {
            let err = UnitError::RemoveDir {
                unit: unit.name.clone(),
                dir: unit.dir.clone(),
                reason: format!("{e:#}"),
            };
            reporter.error(&err.to_string());
            failure.get_or_insert(err);
        }
    }

    match failure {
        Some(err) => Err(err),
        None => Ok(outcome),
    }
}

/// Stop and delete the unit's service. `Ok(None)` when no service matches.
async fn remove_service(
    unit: &RunnerUnit,
    services: &impl ServiceManager,
) -> Result<Option<ServiceHandle>> {
    let Some(service) = services.find(&unit.service_pattern()).await? else {
        return Ok(None);
    };
    // Transitional states (`activating` in a restart loop) are stopped too.
    if services.status(&service).await? != ServiceStatus::Stopped {
        services.stop(&service).await?;
    }
    services.delete(&service).await?;
    Ok(Some(service))
}

/// Deregister the runner through the agent with a fresh removal token.
async fn deregister(
    unit: &RunnerUnit,
    config: &FleetConfig,
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
) -> Result<(), UnitError> {
    let fail = |reason: String| UnitError::Deregister {
        unit: unit.name.clone(),
        reason,
    };

    let token = ports
        .tokens
        .request_removal_token(&config.organization, &config.access_token)
        .await
        .map_err(|e| fail(e.to_string()))?;
    let output = ports
        .agent
        .remove(&unit.dir, &token)
        .await
        .map_err(|e| fail(format!("{e:#}")))?;
    if !output.status.success() {
        let code = output
            .status
            .code()
            .map_or_else(|| "signal".to_string(), |c| c.to_string());
        return Err(fail(format!(
            "remove exited with {code}: {}",
            failure_detail(&output)
        )));
    }
    Ok(())
}
