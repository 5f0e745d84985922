//! Application service: fleet-wide `init` and `destroy` use-cases.
//!
//! Batch-wide steps (token, identity, archive, base directory) abort the
//! run. Unit-scoped failures are recorded in the [`BatchSummary`] and the
//! loop moves on to the next unit.

use anyhow::{Context, Result};

use crate::application::ports::{
    ArtifactStore, CredentialProvider, FleetPorts, LocalFs, ProgressReporter, RunnerAgent,
    ServiceManager, TokenBroker,
};
use crate::application::services::artifact::ensure_artifact;
use crate::application::services::decommission::{DecommissionOutcome, decommission_unit};
use crate::application::services::provision::{
    ProvisionRun, UnitOutcome, provision_unit, resolve_identity,
};
use crate::domain::{BatchSummary, FleetConfig, FleetError, UnitStatus};

/// Provision every unit of the fleet.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the base directory
/// cannot be created, or the registration token, service identity, or
/// runner archive cannot be obtained. Unit failures are not errors; they
/// are reported in the returned summary.
pub async fn init_fleet(
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
) -> Result<BatchSummary> {
    let reporter = ports.reporter;
    config.validate()?;

    ports
        .fs
        .create_dir_all(&config.base_dir)
        .with_context(|| format!("creating base directory {}", config.base_dir.display()))?;

    reporter.step(&format!("requesting registration token for {}...", config.organization));
    let token = ports
        .tokens
        .request_registration_token(&config.organization, &config.access_token)
        .await?;
    reporter.success("registration token acquired");

    let identity = resolve_identity(config.service_account.as_ref(), ports.credentials)?;

    let artifact = config.artifact_path();
    ensure_artifact(
        &artifact,
        &config.artifact_url(),
        config.artifact_sha256.as_deref(),
        ports.fs,
        ports.artifacts,
        reporter,
    )
    .await?;

    let run = ProvisionRun {
        token: &token,
        identity: identity.as_ref(),
        artifact: &artifact,
    };
    let mut summary = BatchSummary::default();
    for unit in config.units() {
        let status = match provision_unit(&unit, config, &run, ports).await {
            Ok(UnitOutcome::Started { .. }) => UnitStatus::Succeeded,
            Ok(UnitOutcome::NotStarted) => {
                UnitStatus::Warned("registered, service not started".to_string())
            }
            Err(e) => {
                reporter.error(&e.to_string());
                UnitStatus::Failed(e.to_string())
            }
        };
        summary.record(&unit.name, status);
    }
    Ok(summary)
}

/// Tear down every unit of the fleet.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the base directory
/// does not exist; in that case no unit is touched.
pub async fn destroy_fleet(
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
) -> Result<BatchSummary> {
    config.validate()?;
    if !ports.fs.exists(&config.base_dir) {
        return Err(FleetError::BaseDirMissing(config.base_dir.clone()).into());
    }

    let mut summary = BatchSummary::default();
    for unit in config.units() {
        // Errors were already reported by the decommissioner.
        let status = match decommission_unit(&unit, config, ports).await {
            Ok(DecommissionOutcome::Skipped) => UnitStatus::Skipped,
            Ok(DecommissionOutcome::NoService) => {
                UnitStatus::Warned("no service found, directory removed".to_string())
            }
            Ok(DecommissionOutcome::ServiceRemoved { .. } | DecommissionOutcome::Deregistered) => {
                UnitStatus::Succeeded
            }
            Err(e) => UnitStatus::Failed(e.to_string()),
        };
        summary.record(&unit.name, status);
    }
    Ok(summary)
}
