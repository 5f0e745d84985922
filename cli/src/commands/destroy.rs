//! `runner-fleet destroy`: stop, deregister, and delete every runner unit.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::fleet::destroy_fleet;
use crate::commands::HostAdapters;
use crate::output::{HumanRenderer, TerminalReporter};

/// Run the `destroy` command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the base
/// directory does not exist. Per-unit failures are reported in the summary.
pub async fn run(app: &AppContext) -> Result<()> {
    let config = app.load_config()?;
    let ctx = &app.output;
    ctx.header(&format!(
        "Decommissioning {} runner(s) in {}",
        config.runner_count,
        config.base_dir.display()
    ));

    let adapters = HostAdapters::new(&config, ctx.show_progress(), app.non_interactive);
    let reporter = TerminalReporter::new(ctx);
    let summary = destroy_fleet(&config, &adapters.ports(&reporter)).await?;

    HumanRenderer::new(ctx).render_summary("destroy", &summary);
    Ok(())
}
