//! Per-file record shared by every aggregator during a single pass.

use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};

/// A snapshot of one visited file.
///
/// Built once per path by [`FileRecord::probe`]; each aggregator reads what it
/// needs and the record is dropped. If the `stat` failed the record is
/// inaccessible: its size is 0 and aggregators leave their state untouched.
#[derive(Debug, Clone)]
pub struct FileRecord {
    path: PathBuf,
    extension: String,
    size: u64,
    mode: Option<u32>,
    error: Option<io::ErrorKind>,
}

impl FileRecord {
    /// Stat `path` (following symlinks) and build a record for it.
    pub fn probe(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match std::fs::metadata(&path) {
            Ok(metadata) => Self::from_metadata(path, &metadata),
            Err(err) => Self::inaccessible(path, err.kind()),
        }
    }

    /// Build a record from metadata that was already fetched.
    pub fn from_metadata(path: impl Into<PathBuf>, metadata: &Metadata) -> Self {
        let path = path.into();
        Self {
            extension: extension_of(&path),
            size: metadata.len(),
            mode: mode_of(metadata),
            error: None,
            path,
        }
    }

    /// Build an accessible record from known values without touching the disk.
    pub fn from_parts(path: impl Into<PathBuf>, size: u64, mode: Option<u32>) -> Self {
        let path = path.into();
        Self {
            extension: extension_of(&path),
            size,
            mode,
            error: None,
            path,
        }
    }

    /// Build a record for a file whose `stat` failed.
    pub fn inaccessible(path: impl Into<PathBuf>, error: io::ErrorKind) -> Self {
        let path = path.into();
        Self {
            extension: extension_of(&path),
            size: 0,
            mode: None,
            error: Some(error),
            path,
        }
    }

    /// Path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lower-cased extension including the leading dot, or `""`.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Size in bytes (0 when inaccessible).
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Unix permission bits, when the platform and `stat` provide them.
    pub fn mode(&self) -> Option<u32> {
        self.mode
    }

    /// Whether the `stat` succeeded.
    pub fn is_accessible(&self) -> bool {
        self.error.is_none()
    }

    /// The `stat` failure, if any.
    pub fn error(&self) -> Option<io::ErrorKind> {
        self.error
    }
}

/// Lower-cased extension of `path` with its leading dot.
///
/// Dotfiles such as `.bashrc` have no extension.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

#[cfg(unix)]
fn mode_of(metadata: &Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(metadata.permissions().mode())
}

#[cfg(not(unix))]
fn mode_of(_metadata: &Metadata) -> Option<u32> {
    None
}
