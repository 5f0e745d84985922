//! Command implementations

pub mod destroy;
pub mod init;

use crate::application::ports::FleetPorts;
use crate::domain::FleetConfig;
use crate::infra::agent::RunnerScripts;
use crate::infra::artifacts::TarGzArtifacts;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::credentials::TerminalCredentialProvider;
use crate::infra::fs::HostFs;
use crate::infra::github::GithubTokenBroker;
use crate::infra::systemd::SystemdServiceManager;
use crate::output::TerminalReporter;

/// Production adapters for one fleet run, owned by the command handler.
pub(crate) struct HostAdapters {
    tokens: GithubTokenBroker,
    artifacts: TarGzArtifacts,
    fs: HostFs,
    agent: RunnerScripts<TokioCommandRunner>,
    services: SystemdServiceManager<TokioCommandRunner>,
    credentials: TerminalCredentialProvider,
}

impl HostAdapters {
    pub(crate) fn new(config: &FleetConfig, show_progress: bool, non_interactive: bool) -> Self {
        Self {
            tokens: GithubTokenBroker::new(config.api_url.clone()),
            artifacts: TarGzArtifacts::new(show_progress),
            fs: HostFs,
            agent: RunnerScripts::new(TokioCommandRunner::default()),
            services: SystemdServiceManager::new(TokioCommandRunner::default()),
            credentials: TerminalCredentialProvider::new(non_interactive),
        }
    }

    #[allow(clippy::type_complexity)]
    pub(crate) fn ports<'a>(
        &'a self,
        reporter: &'a TerminalReporter<'a>,
    ) -> FleetPorts<
        'a,
        GithubTokenBroker,
        TarGzArtifacts,
        HostFs,
        RunnerScripts<TokioCommandRunner>,
        SystemdServiceManager<TokioCommandRunner>,
        TerminalCredentialProvider,
        TerminalReporter<'a>,
    > {
        FleetPorts {
            tokens: &self.tokens,
            artifacts: &self.artifacts,
            fs: &self.fs,
            agent: &self.agent,
            services: &self.services,
            credentials: &self.credentials,
            reporter,
        }
    }
}
