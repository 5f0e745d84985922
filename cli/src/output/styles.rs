//! Severity styles for fleet console output.

use owo_colors::Style;

/// One style per message severity, plus the summary header and key columns.
///
/// `Styles::default()` is plain text; [`Styles::colorize`] switches colors on
/// once `OutputContext` has decided the terminal wants them.
#[derive(Default, Clone)]
pub struct Styles {
    /// `→` marker of a unit step.
    pub step: Style,
    /// `✓` marker of a completed step.
    pub success: Style,
    /// `!` marker of a non-fatal problem.
    pub warning: Style,
    /// `✗` marker and failure counts.
    pub error: Style,
    /// Summary keys.
    pub dim: Style,
    /// Summary title.
    pub header: Style,
}

impl Styles {
    pub fn colorize(&mut self) {
        *self = Self {
            step: Style::new().cyan(),
            success: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red(),
            dim: Style::new().dimmed(),
            header: Style::new().bold().cyan(),
        };
    }
}
