//! `runner-fleet init`: register and start every runner unit.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::fleet::init_fleet;
use crate::commands::HostAdapters;
use crate::output::{HumanRenderer, TerminalReporter};

/// Run the `init` command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or a fleet-wide
/// step (token, identity, runner archive) fails. Per-unit failures are
/// reported in the summary and do not make the command fail.
pub async fn run(app: &AppContext) -> Result<()> {
    let config = app.load_config()?;
    let ctx = &app.output;
    ctx.header(&format!(
        "Provisioning {} runner(s) for {} in {}",
        config.runner_count,
        config.organization,
        config.base_dir.display()
    ));

    let adapters = HostAdapters::new(&config, ctx.show_progress(), app.non_interactive);
    let reporter = TerminalReporter::new(ctx);
    let summary = init_fleet(&config, &adapters.ports(&reporter)).await?;

    HumanRenderer::new(ctx).render_summary("init", &summary);
    Ok(())
}
