//! Single-pass audit: one walk feeding every aggregator.

use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Serialize;

use fsaudit_core::{AuditConfig, Confirm, DeleteMode, FileRecord, ScanError, ScanWarning};
use fsaudit_scan::{WalkStats, Walker};

use crate::aggregator::{Aggregator, Purge};
use crate::categories::{CategoryReport, Categorizer};
use crate::classifier::ExtensionClassifier;
use crate::deletion::DeletionReport;
use crate::large_files::{LargeFileFinder, LargeFileReport};
use crate::permissions::{PermissionChecker, PermissionReport};
use crate::statistics::{StatisticsCollector, StatisticsReport};

/// Prompt for batch deletion of files flagged for permissions.
pub const PERMISSIONS_PROMPT: &str = "Do you want to delete the files with bad permissions?";
/// Prompt for batch deletion of large files.
pub const LARGE_FILES_PROMPT: &str = "Do you want to delete the large files?";

/// What the walk itself saw.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanSummary {
    pub root: PathBuf,
    pub walk: WalkStats,
    pub warnings: Vec<ScanWarning>,
    pub duration: Duration,
}

/// Every report from one audit.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub scan: ScanSummary,
    pub categories: CategoryReport,
    pub permissions: PermissionReport,
    pub large_files: LargeFileReport,
    pub statistics: StatisticsReport,
}

impl fmt::Display for AuditReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.categories)?;
        writeln!(f, "{}", self.permissions)?;
        writeln!(f, "{}", self.large_files)?;
        write!(f, "{}", self.statistics)?;
        if !self.scan.warnings.is_empty() {
            writeln!(f)?;
            writeln!(f, "{} warning(s) during scan", self.scan.warnings.len())?;
        }
        Ok(())
    }
}

/// Deletion results for one purge.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PurgeOutcome {
    /// `None` when nothing was flagged or deletion was declined.
    pub permissions: Option<DeletionReport>,
    pub large_files: Option<DeletionReport>,
}

/// Owns the four aggregators for one scan of one root.
#[derive(Debug)]
pub struct Audit {
    root: PathBuf,
    follow_symlinks: bool,
    categories: Categorizer,
    permissions: PermissionChecker,
    large_files: LargeFileFinder,
    statistics: StatisticsCollector,
    summary: ScanSummary,
}

impl Audit {
    /// Build the aggregators. Fails on a malformed threshold, an unreadable
    /// categories file or a root that is not a readable directory.
    pub fn new(config: &AuditConfig) -> Result<Self, ScanError> {
        let large_files = LargeFileFinder::new(config.threshold_bytes()?);
        let categories = match config.categories_file {
            Some(ref path) => {
                Categorizer::with_classifier(ExtensionClassifier::from_json_file(path)?)
            }
            None => Categorizer::new(),
        };

        let metadata =
            std::fs::metadata(&config.root).map_err(|e| ScanError::io(&config.root, e))?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory {
                path: config.root.clone(),
            });
        }

        Ok(Self {
            root: config.root.clone(),
            follow_symlinks: config.follow_symlinks,
            categories,
            permissions: PermissionChecker::new(),
            large_files,
            statistics: StatisticsCollector::new(),
            summary: ScanSummary {
                root: config.root.clone(),
                ..ScanSummary::default()
            },
        })
    }

    /// Walk the root once, feeding every file to each aggregator.
    pub fn run(&mut self) -> &ScanSummary {
        let start = Instant::now();
        tracing::info!(root = %self.root.display(), "starting audit");

        let mut walker = Walker::new(&self.root).follow_symlinks(self.follow_symlinks);
        for path in walker.by_ref() {
            let record = FileRecord::probe(path);
            if let Some(kind) = record.error() {
                tracing::warn!(path = %record.path().display(), error = ?kind, "cannot stat file");
                continue;
            }
            for aggregator in self.aggregators() {
                aggregator.add(&record);
            }
        }

        self.summary.walk = walker.stats();
        self.summary.warnings.extend(walker.take_warnings());
        self.summary.duration = start.elapsed();
        tracing::info!(
            files = self.summary.walk.files_yielded,
            warnings = self.summary.warnings.len(),
            "audit finished in {:.2}s",
            self.summary.duration.as_secs_f64()
        );
        &self.summary
    }

    fn aggregators(&mut self) -> [&mut dyn Aggregator; 4] {
        [
            &mut self.categories,
            &mut self.permissions,
            &mut self.large_files,
            &mut self.statistics,
        ]
    }

    pub fn summary(&self) -> &ScanSummary {
        &self.summary
    }

    pub fn categories(&self) -> &Categorizer {
        &self.categories
    }

    pub fn permissions(&self) -> &PermissionChecker {
        &self.permissions
    }

    pub fn large_files(&self) -> &LargeFileFinder {
        &self.large_files
    }

    pub fn statistics(&self) -> &StatisticsCollector {
        &self.statistics
    }

    /// Collect every report.
    pub fn report(&self) -> AuditReport {
        AuditReport {
            scan: self.summary.clone(),
            categories: self.categories.summarize(),
            permissions: self.permissions.summarize(),
            large_files: self.large_files.summarize(),
            statistics: self.statistics.summarize(),
        }
    }

    /// Offer deletion of flagged files: permissions first, then large files.
    pub fn purge(&self, mode: DeleteMode, confirm: &mut dyn Confirm) -> PurgeOutcome {
        PurgeOutcome {
            permissions: purge_one(&self.permissions, mode, PERMISSIONS_PROMPT, confirm),
            large_files: purge_one(&self.large_files, mode, LARGE_FILES_PROMPT, confirm),
        }
    }
}

fn purge_one(
    target: &dyn Purge,
    mode: DeleteMode,
    prompt: &str,
    confirm: &mut dyn Confirm,
) -> Option<DeletionReport> {
    if target.is_empty() {
        return None;
    }
    match mode {
        DeleteMode::Never => None,
        DeleteMode::Batch => confirm.confirm(prompt).then(|| target.delete_flagged()),
        DeleteMode::OneByOne => Some(target.delete_each(confirm)),
    }
}
