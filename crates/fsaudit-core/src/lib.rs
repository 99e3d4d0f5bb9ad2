//! Core types for fsaudit.
//!
//! This crate holds the pieces every other fsaudit crate leans on: the
//! per-file [`FileRecord`], human-readable size handling, configuration,
//! the deletion [`Confirm`] hook and the error types.

mod config;
mod confirm;
mod error;
mod record;
pub mod size;

pub use config::{AuditConfig, AuditConfigBuilder, DeleteMode, Settings, SizeSetting};
pub use confirm::{Confirm, Decline};
pub use error::{ConfigError, ScanError, ScanWarning, SizeParseError, WarningKind};
pub use record::{FileRecord, extension_of};
pub use size::{DEFAULT_THRESHOLD, format_size, parse_size};
