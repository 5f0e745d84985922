//! Per-unit results of a batch run, folded into a summary.

/// Result of one unit in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitStatus {
    Succeeded,
    /// Nothing to do for this unit.
    Skipped,
    /// Completed with a reportable gap, e.g. service not started.
    Warned(String),
    Failed(String),
}

/// Report line for one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitReport {
    pub unit: String,
    pub status: UnitStatus,
}

/// Outcome of a whole `init` or `destroy` run.
///
/// Partial success is a normal outcome; a summary is returned even when
/// every unit failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub reports: Vec<UnitReport>,
}

impl BatchSummary {
    pub fn record(&mut self, unit: &str, status: UnitStatus) {
        self.reports.push(UnitReport {
            unit: unit.to_string(),
            status,
        });
    }

    #[must_use]
    pub fn attempted(&self) -> usize {
        self.reports.len()
    }

    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.count(|s| matches!(s, UnitStatus::Succeeded))
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, UnitStatus::Skipped))
    }

    #[must_use]
    pub fn warned(&self) -> usize {
        self.count(|s| matches!(s, UnitStatus::Warned(_)))
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, UnitStatus::Failed(_)))
    }

    /// Reports of failed units.
    pub fn failures(&self) -> impl Iterator<Item = &UnitReport> {
        self.reports
            .iter()
            .filter(|r| matches!(r.status, UnitStatus::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&UnitStatus) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.status)).count()
    }
}
