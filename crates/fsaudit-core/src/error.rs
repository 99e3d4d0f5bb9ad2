//! Error and warning types shared across the audit pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that stop an audit before it starts.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// The large-file threshold could not be parsed.
    #[error("Invalid size threshold: {0}")]
    InvalidThreshold(#[from] SizeParseError),

    /// Configuration could not be loaded or validated.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

/// Errors from parsing a human-readable size such as `"10 MiB"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizeParseError {
    /// Nothing to parse.
    #[error("empty size string")]
    Empty,

    /// The numeric part is missing, malformed or negative.
    #[error("invalid number {number:?} in size {input:?}")]
    InvalidNumber { input: String, number: String },

    /// The unit suffix is not recognised.
    #[error("unknown unit {unit:?} in size {input:?} (expected B, KB, KiB, MB, MiB, GB, GiB, ...)")]
    UnknownUnit { input: String, unit: String },

    /// The value does not fit in 64 bits of bytes.
    #[error("size {input:?} is too large")]
    Overflow { input: String },
}

/// Errors from loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for the expected schema.
    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The category table is not valid.
    #[error("invalid category table {origin}: {message}")]
    Categories { origin: String, message: String },
}

/// Kind of scan warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Permission was denied while listing a directory.
    PermissionDenied,
    /// The directory could not be listed for another reason.
    ReadError,
    /// A single directory entry could not be read.
    EntryError,
    /// A symbolic link leads back to one of its own ancestor directories.
    SymlinkLoop,
}

/// Non-fatal warning encountered during a walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new scan warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a warning for a directory that could not be listed.
    pub fn unreadable_dir(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let path = path.into();
        let kind = if error.kind() == std::io::ErrorKind::PermissionDenied {
            WarningKind::PermissionDenied
        } else {
            WarningKind::ReadError
        };
        Self {
            message: format!("cannot read directory {}: {error}", path.display()),
            path,
            kind,
        }
    }

    /// Create a warning for a link that points back at one of its ancestors.
    pub fn symlink_loop(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            message: format!(
                "symbolic link loops back to an ancestor directory: {}",
                path.display()
            ),
            path,
            kind: WarningKind::SymlinkLoop,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_io() {
        let err = ScanError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, ScanError::PermissionDenied { .. }));

        let err = ScanError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, ScanError::NotFound { .. }));
    }

    #[test]
    fn test_unreadable_dir_kind() {
        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let warning = ScanWarning::unreadable_dir("/root/secret", &denied);
        assert_eq!(warning.kind, WarningKind::PermissionDenied);
        assert!(warning.message.contains("/root/secret"));

        let other = std::io::Error::other("boom");
        let warning = ScanWarning::unreadable_dir("/tmp/x", &other);
        assert_eq!(warning.kind, WarningKind::ReadError);
    }

    #[test]
    fn test_symlink_loop_message() {
        let warning = ScanWarning::symlink_loop("/data/sub/back");
        assert_eq!(warning.kind, WarningKind::SymlinkLoop);
        assert!(warning.message.contains("ancestor"));
        assert!(warning.message.ends_with("/data/sub/back"));
    }

    #[test]
    fn test_threshold_error_message() {
        let err: ScanError = SizeParseError::UnknownUnit {
            input: "1 KiBb".into(),
            unit: "KiBb".into(),
        }
        .into();
        let message = err.to_string();
        assert!(message.contains("Invalid size threshold"));
        assert!(message.contains("KiBb"));
    }
}
