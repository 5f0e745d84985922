//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags};
use crate::commands;
use crate::domain::config::CONFIG_ENV;

/// Provision and tear down fleets of self-hosted GitHub Actions runners
#[derive(Parser)]
#[command(
    name = "runner-fleet",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Fleet configuration file [default: ~/.runner-fleet/config.yaml]
    #[arg(long, global = true, env = CONFIG_ENV, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output (`NO_COLOR` is honored as well)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Never prompt; fail instead of asking for a service account password
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Register and start every runner of the fleet
    Init,

    /// Stop, deregister, and delete every runner of the fleet
    Destroy,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or a
    /// fleet-wide step fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            config,
            quiet,
            no_color,
            yes,
            command,
        } = self;
        let app = AppContext::new(&AppFlags {
            output: OutputFlags { no_color, quiet },
            behaviour: BehaviourFlags { yes },
            config,
        });
        match command {
            Command::Init => commands::init::run(&app).await,
            Command::Destroy => commands::destroy::run(&app).await,
        }
    }
}
