//! Application context: unified state passed to every command handler.
//!
//! Adding a new cross-cutting concern (e.g. `--verbose`) requires only one
//! field change here; no command signature changes.

use std::path::PathBuf;

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::FleetConfig;
use crate::infra::config::YamlConfigStore;
use crate::output::OutputContext;

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

/// Behaviour flags.
pub struct BehaviourFlags {
    /// Skip interactive prompts (also set by the `CI` env var).
    pub yes: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Behaviour options.
    pub behaviour: BehaviourFlags,
    /// Explicit configuration file, overriding the default location.
    pub config: Option<PathBuf>,
}

/// Unified application context passed to every command handler.
///
/// Constructed once in `Cli::run()` and passed as `&AppContext` to all
/// command handlers.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Where the fleet configuration is read from.
    pub config_store: YamlConfigStore,
    /// When `true`, never prompt.
    ///
    /// Set when `--yes` / `-y` is passed, or when the `CI` environment
    /// variable is present.
    pub non_interactive: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: &AppFlags) -> Self {
        let non_interactive = flags.behaviour.yes || std::env::var("CI").is_ok();
        let config_store = flags
            .config
            .clone()
            .map_or_else(YamlConfigStore::default, YamlConfigStore::at);

        Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet),
            config_store,
            non_interactive,
        }
    }

    /// Load and validate the fleet configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unparseable, or invalid.
    pub fn load_config(&self) -> Result<FleetConfig> {
        self.config_store.load()
    }
}
