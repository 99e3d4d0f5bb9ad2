//! Deletion of flagged files and per-file outcomes.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use fsaudit_core::Confirm;

/// What happened to one flagged file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum DeletionStatus {
    Deleted,
    Failed(String),
    /// The user declined.
    Skipped,
}

/// Outcome for a single path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionOutcome {
    pub path: PathBuf,
    pub status: DeletionStatus,
}

/// Outcomes of one purge, in the order files were processed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionReport {
    pub outcomes: Vec<DeletionOutcome>,
}

impl DeletionReport {
    /// Number of files removed.
    pub fn deleted(&self) -> usize {
        self.count(|s| matches!(s, DeletionStatus::Deleted))
    }

    /// Number of files that could not be removed.
    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, DeletionStatus::Failed(_)))
    }

    /// Number of files left alone on request.
    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, DeletionStatus::Skipped))
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    fn count(&self, pred: impl Fn(&DeletionStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }

    fn push(&mut self, path: &Path, status: DeletionStatus) {
        self.outcomes.push(DeletionOutcome {
            path: path.to_path_buf(),
            status,
        });
    }
}

impl fmt::Display for DeletionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            match &outcome.status {
                DeletionStatus::Deleted => writeln!(f, "Deleted: {}", outcome.path.display())?,
                DeletionStatus::Failed(reason) => writeln!(
                    f,
                    "Error deleting {}: {reason}",
                    outcome.path.display()
                )?,
                DeletionStatus::Skipped => {
                    writeln!(f, "Not deleted: {}", outcome.path.display())?
                }
            }
        }
        write!(
            f,
            "{} deleted, {} failed, {} skipped",
            self.deleted(),
            self.failed(),
            self.skipped()
        )
    }
}

/// Remove a single file, logging the outcome.
pub fn delete_file(path: &Path) -> DeletionStatus {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::info!(path = %path.display(), "deleted");
            DeletionStatus::Deleted
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to delete");
            DeletionStatus::Failed(err.to_string())
        }
    }
}

/// Remove every path. A failure never stops the rest.
pub fn delete_all<'a>(paths: impl IntoIterator<Item = &'a Path>) -> DeletionReport {
    let mut report = DeletionReport::default();
    for path in paths {
        report.push(path, delete_file(path));
    }
    report
}

/// Ask about each path in turn and remove the ones confirmed.
pub fn delete_confirmed<'a>(
    paths: impl IntoIterator<Item = &'a Path>,
    confirm: &mut dyn Confirm,
) -> DeletionReport {
    let mut report = DeletionReport::default();
    for path in paths {
        let prompt = format!("Do you want to delete {}?", path.display());
        let status = if confirm.confirm(&prompt) {
            delete_file(path)
        } else {
            tracing::debug!(path = %path.display(), "not deleted");
            DeletionStatus::Skipped
        };
        report.push(path, status);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_delete_all_continues_past_failures() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a.bin");
        let missing = temp.path().join("missing.bin");
        let b = temp.path().join("b.bin");
        fs::write(&a, "a").unwrap();
        fs::write(&b, "b").unwrap();

        let report = delete_all([a.as_path(), missing.as_path(), b.as_path()]);

        assert_eq!(report.deleted(), 2);
        assert_eq!(report.failed(), 1);
        assert!(!a.exists());
        assert!(!b.exists());
        assert!(matches!(report.outcomes[1].status, DeletionStatus::Failed(_)));
    }

    #[test]
    fn test_delete_confirmed_respects_answers() {
        let temp = TempDir::new().unwrap();
        let keep = temp.path().join("keep.txt");
        let doomed = temp.path().join("doomed.txt");
        fs::write(&keep, "k").unwrap();
        fs::write(&doomed, "d").unwrap();

        let mut prompts = Vec::new();
        let mut confirm = |prompt: &str| {
            prompts.push(prompt.to_string());
            prompt.contains("doomed.txt")
        };
        let report = delete_confirmed([keep.as_path(), doomed.as_path()], &mut confirm);

        assert_eq!(prompts.len(), 2);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.deleted(), 1);
        assert!(keep.exists());
        assert!(!doomed.exists());
    }

    #[test]
    fn test_display_summary_line() {
        let report = DeletionReport {
            outcomes: vec![DeletionOutcome {
                path: PathBuf::from("/tmp/x"),
                status: DeletionStatus::Skipped,
            }],
        };
        let text = report.to_string();
        assert!(text.contains("Not deleted: /tmp/x"));
        assert!(text.ends_with("0 deleted, 0 failed, 1 skipped"));
    }
}
