//! Terminal infrastructure: implements `CredentialProvider` with a hidden
//! password prompt.

use anyhow::{Context, Result};

use crate::application::ports::CredentialProvider;
use crate::domain::Identity;

/// Prompts on the controlling terminal for a service account password.
pub struct TerminalCredentialProvider {
    non_interactive: bool,
}

impl TerminalCredentialProvider {
    /// With `non_interactive` set, prompting is refused instead of blocking
    /// on a terminal nobody is watching.
    #[must_use]
    pub fn new(non_interactive: bool) -> Self {
        Self { non_interactive }
    }
}

impl CredentialProvider for TerminalCredentialProvider {
    fn resolve_service_identity(&self, username: &str) -> Result<Identity> {
        if self.non_interactive {
            anyhow::bail!(
                "no password configured for service account '{username}' and prompting is disabled (CI or --yes)"
            );
        }
        let password = dialoguer::Password::new()
            .with_prompt(format!("Password for service account '{username}'"))
            .interact()
            .context("reading service account password")?;
        Ok(Identity {
            username: username.to_string(),
            password,
        })
    }
}
