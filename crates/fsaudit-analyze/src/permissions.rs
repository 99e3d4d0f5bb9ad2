//! Detection of files with risky permission bits.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use fsaudit_core::FileRecord;

use crate::aggregator::{AnalysisReport, Aggregator, Purge, write_heading};

/// A string that is not a valid `rwxrwxrwx` pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid permission pattern {input:?}: expected 9 characters like \"rwxr-xr--\"")]
pub struct PatternError {
    pub input: String,
}

const SLOTS: [u8; 3] = [b'r', b'w', b'x'];

/// Permission bits rendered as nine `r`/`w`/`x`/`-` characters
/// (owner, group, others).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionPattern([u8; 9]);

impl PermissionPattern {
    /// Render the low nine bits of a Unix mode. Higher bits are ignored.
    pub fn from_mode(mode: u32) -> Self {
        let mut chars = [b'-'; 9];
        for (i, c) in chars.iter_mut().enumerate() {
            if mode & (0o400 >> i) != 0 {
                *c = SLOTS[i % 3];
            }
        }
        Self(chars)
    }

    /// The mode bits this pattern describes.
    pub fn to_mode(self) -> u32 {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, c)| **c != b'-')
            .fold(0, |mode, (i, _)| mode | (0o400 >> i))
    }

    pub fn as_str(&self) -> &str {
        // Only ever built from ASCII.
        std::str::from_utf8(&self.0).unwrap_or("?????????")
    }

    /// Whether every class (owner, group, others) can write.
    pub fn all_classes_writable(self) -> bool {
        self.0.chunks(3).all(|group| group[1] == b'w')
    }
}

impl FromStr for PermissionPattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let valid = bytes.len() == 9
            && bytes
                .iter()
                .enumerate()
                .all(|(i, &c)| c == b'-' || c == SLOTS[i % 3]);
        if !valid {
            return Err(PatternError { input: s.to_string() });
        }

        let mut chars = [0u8; 9];
        chars.copy_from_slice(bytes);
        Ok(Self(chars))
    }
}

impl TryFrom<String> for PermissionPattern {
    type Error = PatternError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PermissionPattern> for String {
    fn from(pattern: PermissionPattern) -> Self {
        pattern.as_str().to_string()
    }
}

impl fmt::Display for PermissionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Patterns considered unsafe.
///
/// Every combination where owner, group and others all have write access,
/// plus `---------`, `rwxrwxrwx`, `--x--x--x` and `r-xr-xr-x`.
pub fn risky_patterns() -> HashSet<PermissionPattern> {
    let mut risky: HashSet<PermissionPattern> = (0..=0o777u32)
        .map(PermissionPattern::from_mode)
        .filter(|p| p.all_classes_writable())
        .collect();
    risky.extend([0o000, 0o777, 0o111, 0o555].map(PermissionPattern::from_mode));
    risky
}

/// A file whose permissions matched a risky pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlaggedFile {
    pub path: PathBuf,
    pub pattern: PermissionPattern,
}

/// Flags files whose permission bits are in the risky set.
#[derive(Debug, Clone)]
pub struct PermissionChecker {
    risky: HashSet<PermissionPattern>,
    flagged: Vec<FlaggedFile>,
}

impl Default for PermissionChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionChecker {
    pub fn new() -> Self {
        Self {
            risky: risky_patterns(),
            flagged: Vec::new(),
        }
    }

    /// Whether `pattern` is in this checker's risky set.
    pub fn is_risky(&self, pattern: PermissionPattern) -> bool {
        self.risky.contains(&pattern)
    }

    /// Flagged files in the order they were seen.
    pub fn flagged(&self) -> &[FlaggedFile] {
        &self.flagged
    }

    pub fn is_empty(&self) -> bool {
        self.flagged.is_empty()
    }

    /// Build the permission report.
    pub fn summarize(&self) -> PermissionReport {
        PermissionReport {
            flagged: self.flagged.clone(),
        }
    }
}

impl Aggregator for PermissionChecker {
    fn name(&self) -> &'static str {
        "permissions"
    }

    fn add(&mut self, record: &FileRecord) {
        let Some(mode) = record.mode() else {
            return;
        };
        if !record.is_accessible() {
            return;
        }

        let pattern = PermissionPattern::from_mode(mode);
        if self.is_risky(pattern) {
            tracing::debug!(path = %record.path().display(), %pattern, "risky permissions");
            self.flagged.push(FlaggedFile {
                path: record.path().to_path_buf(),
                pattern,
            });
        }
    }

    fn report(&self) -> AnalysisReport {
        AnalysisReport::Permissions(self.summarize())
    }
}

impl Purge for PermissionChecker {
    fn flagged_paths(&self) -> Vec<&Path> {
        self.flagged.iter().map(|f| f.path.as_path()).collect()
    }

    fn is_empty(&self) -> bool {
        self.flagged.is_empty()
    }
}

/// Files flagged for risky permissions, in encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionReport {
    pub flagged: Vec<FlaggedFile>,
}

impl PermissionReport {
    pub fn is_empty(&self) -> bool {
        self.flagged.is_empty()
    }
}

impl fmt::Display for PermissionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_heading(f, "Permission Report")?;
        if self.is_empty() {
            return writeln!(f, " No files with bad permissions found.");
        }

        for file in &self.flagged {
            writeln!(f, " {}  {}", file.pattern, file.path.display())?;
        }
        Ok(())
    }
}
