//! The interface every single-pass analysis implements.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use fsaudit_core::{Confirm, FileRecord};

use crate::categories::CategoryReport;
use crate::deletion::{self, DeletionReport};
use crate::large_files::LargeFileReport;
use crate::permissions::PermissionReport;
use crate::statistics::StatisticsReport;

/// Consumes file records one at a time and summarizes them on demand.
///
/// Implementations must treat an inaccessible record as a no-op, and
/// `report` must not change state that affects the next report.
pub trait Aggregator {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Fold one record into the running state.
    fn add(&mut self, record: &FileRecord);

    /// Stat `path` and fold the result in.
    fn add_path(&mut self, path: &Path) {
        self.add(&FileRecord::probe(path));
    }

    /// Snapshot of the current state.
    fn report(&self) -> AnalysisReport;
}

/// Aggregators that flag files which may then be deleted.
pub trait Purge {
    /// Paths currently flagged, in report order.
    fn flagged_paths(&self) -> Vec<&Path>;

    /// Check if nothing is flagged.
    fn is_empty(&self) -> bool {
        self.flagged_paths().is_empty()
    }

    /// Delete every flagged file.
    fn delete_flagged(&self) -> DeletionReport {
        deletion::delete_all(self.flagged_paths())
    }

    /// Ask `confirm` about each flagged file and delete the approved ones.
    fn delete_each(&self, confirm: &mut dyn Confirm) -> DeletionReport {
        deletion::delete_confirmed(self.flagged_paths(), confirm)
    }
}

/// Report produced by any aggregator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisReport {
    Categories(CategoryReport),
    LargeFiles(LargeFileReport),
    Permissions(PermissionReport),
    Statistics(StatisticsReport),
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Categories(report) => write!(f, "{report}"),
            Self::LargeFiles(report) => write!(f, "{report}"),
            Self::Permissions(report) => write!(f, "{report}"),
            Self::Statistics(report) => write!(f, "{report}"),
        }
    }
}

/// Section header used by every text report.
pub(crate) fn write_heading(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "{}", "─".repeat(60))?;
    writeln!(f, " {title}")?;
    writeln!(f, "{}", "─".repeat(60))
}
