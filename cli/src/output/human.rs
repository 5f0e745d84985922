//! Human-readable terminal renderer.

use owo_colors::OwoColorize as _;

use crate::domain::{BatchSummary, UnitStatus};
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the end-of-run summary of a batch operation.
    ///
    /// Unit messages were already reported while the batch ran, so only
    /// unit names are listed here. Failed units are listed even in quiet
    /// mode.
    pub fn render_summary(&self, operation: &str, summary: &BatchSummary) {
        if !self.ctx.quiet {
            println!();
            self.ctx.header(&format!("{operation} summary"));
            self.ctx.kv("Units:     ", &summary.attempted().to_string());
            self.ctx.kv("Succeeded: ", &summary.succeeded().to_string());
            if summary.skipped() > 0 {
                self.ctx.kv("Skipped:   ", &summary.skipped().to_string());
            }
            if summary.warned() > 0 {
                self.ctx.kv("Warnings:  ", &summary.warned().to_string());
            }
            self.ctx
                .kv("Failed:    ", &format_count(summary.failed(), self.ctx));
        }

        if let Some(names) = unit_names(summary, |s| matches!(s, UnitStatus::Warned(_))) {
            self.ctx.warn(&format!("units with warnings: {names}"));
        }
        if let Some(names) = unit_names(summary, |s| matches!(s, UnitStatus::Failed(_))) {
            self.ctx.error(&format!("failed units: {names}"));
        }
    }
}

/// Comma-separated names of the units whose status matches `pred`.
pub(crate) fn unit_names(
    summary: &BatchSummary,
    pred: impl Fn(&UnitStatus) -> bool,
) -> Option<String> {
    let names: Vec<&str> = summary
        .reports
        .iter()
        .filter(|r| pred(&r.status))
        .map(|r| r.unit.as_str())
        .collect();
    (!names.is_empty()).then(|| names.join(", "))
}

fn format_count(count: usize, ctx: &OutputContext) -> String {
    if count == 0 {
        count.to_string()
    } else {
        count.style(ctx.styles.error).to_string()
    }
}
