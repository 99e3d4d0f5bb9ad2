//! Files at or above a size threshold, kept sorted by size.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use fsaudit_core::{DEFAULT_THRESHOLD, FileRecord, SizeParseError, format_size, parse_size};

use crate::aggregator::{AnalysisReport, Aggregator, Purge, write_heading};

/// A file that met the threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LargeFileEntry {
    pub path: PathBuf,
    pub size: u64,
}

/// Collects files whose size is at least the threshold.
///
/// Entries stay in ascending size order after every add. A new entry goes in
/// front of any existing entries of the same size.
#[derive(Debug, Clone)]
pub struct LargeFileFinder {
    threshold: u64,
    entries: Vec<LargeFileEntry>,
}

impl Default for LargeFileFinder {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl LargeFileFinder {
    /// Create a finder with a threshold in bytes.
    pub fn new(threshold: u64) -> Self {
        Self {
            threshold,
            entries: Vec::new(),
        }
    }

    /// Create a finder from a human-readable threshold such as `"250 MB"`.
    pub fn from_threshold_str(threshold: &str) -> Result<Self, SizeParseError> {
        Ok(Self::new(parse_size(threshold)?))
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Entries in ascending size order.
    pub fn entries(&self) -> &[LargeFileEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, path: &Path, size: u64) {
        let at = self.entries.partition_point(|e| e.size < size);
        self.entries.insert(
            at,
            LargeFileEntry {
                path: path.to_path_buf(),
                size,
            },
        );
    }

    /// Build the large-file report.
    pub fn summarize(&self) -> LargeFileReport {
        LargeFileReport {
            threshold: self.threshold,
            entries: self.entries.clone(),
        }
    }
}

impl Aggregator for LargeFileFinder {
    fn name(&self) -> &'static str {
        "large_files"
    }

    fn add(&mut self, record: &FileRecord) {
        if !record.is_accessible() || record.size() < self.threshold {
            return;
        }
        tracing::debug!(path = %record.path().display(), size = record.size(), "large file");
        self.insert(record.path(), record.size());
    }

    fn report(&self) -> AnalysisReport {
        AnalysisReport::LargeFiles(self.summarize())
    }
}

impl Purge for LargeFileFinder {
    fn flagged_paths(&self) -> Vec<&Path> {
        self.entries.iter().map(|e| e.path.as_path()).collect()
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Large files found, smallest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LargeFileReport {
    pub threshold: u64,
    pub entries: Vec<LargeFileEntry>,
}

impl LargeFileReport {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Combined size of every entry.
    pub fn total_size(&self) -> u64 {
        self.entries.iter().map(|e| e.size).sum()
    }
}

impl fmt::Display for LargeFileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_heading(f, "Large Files")?;
        if self.is_empty() {
            return writeln!(f, " No large files found.");
        }

        writeln!(
            f,
            " {} file(s) at or above {}",
            self.entries.len(),
            format_size(self.threshold)
        )?;
        writeln!(f)?;
        for entry in &self.entries {
            writeln!(f, " {:>12}  {}", format_size(entry.size), entry.path.display())?;
        }
        Ok(())
    }
}
