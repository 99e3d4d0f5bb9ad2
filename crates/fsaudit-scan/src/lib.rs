//! Directory traversal for fsaudit.
//!
//! [`Walker`] is a lazy iterator over every non-directory path under a root.
//! It runs on the calling thread, pulls one directory listing at a time and
//! never aborts: directories that cannot be read are skipped and reported as
//! [`ScanWarning`]s (and as `tracing` warnings on the diagnostic stream).
//!
//! # Example
//!
//! ```rust,no_run
//! use fsaudit_scan::Walker;
//!
//! let mut walker = Walker::new("/path/to/scan");
//! for path in walker.by_ref() {
//!     println!("{}", path.display());
//! }
//!
//! println!("{} directories skipped", walker.stats().dirs_skipped);
//! ```

mod ancestors;
mod walker;

pub use ancestors::Ancestors;
pub use walker::{WalkStats, Walker};

// Re-export core types for convenience
pub use fsaudit_core::{ScanWarning, WarningKind};
