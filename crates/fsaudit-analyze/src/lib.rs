//! Single-pass file system audit.
//!
//! Every file found by the walker is stat-ed once and handed, in order, to
//! four independent aggregators:
//!
//! - **Categories** - files grouped by category and extension
//! - **Permissions** - files whose mode bits are in a risky set
//! - **Large files** - files at or above a size threshold, sorted by size
//! - **Statistics** - count, total, average and extremes of file sizes
//!
//! The permission and large-file aggregators can delete what they flagged,
//! either in one batch or after confirming each file.
//!
//! ```rust,ignore
//! use fsaudit_analyze::Audit;
//! use fsaudit_core::{AuditConfig, Decline, DeleteMode};
//!
//! let config = AuditConfig::builder()
//!     .root("/srv/share")
//!     .size_threshold("500 MiB")
//!     .build()?;
//!
//! let mut audit = Audit::new(&config)?;
//! audit.run();
//! println!("{}", audit.report());
//!
//! audit.purge(DeleteMode::Batch, &mut Decline);
//! ```

mod aggregator;
pub mod categories;
pub mod classifier;
pub mod deletion;
pub mod large_files;
pub mod permissions;
mod pipeline;
pub mod statistics;

pub use aggregator::{Aggregator, AnalysisReport, Purge};
pub use categories::{CategoryReport, CategorySummary, Categorizer, ExtensionStats};
pub use classifier::{ExtensionClassifier, OTHER, classify};
pub use deletion::{DeletionOutcome, DeletionReport, DeletionStatus};
pub use large_files::{LargeFileEntry, LargeFileFinder, LargeFileReport};
pub use permissions::{
    FlaggedFile, PatternError, PermissionChecker, PermissionPattern, PermissionReport,
    risky_patterns,
};
pub use pipeline::{
    Audit, AuditReport, LARGE_FILES_PROMPT, PERMISSIONS_PROMPT, PurgeOutcome, ScanSummary,
};
pub use statistics::{StatisticsCollector, StatisticsReport};

// Re-export core types
pub use fsaudit_core::{AuditConfig, Confirm, DeleteMode, FileRecord};
