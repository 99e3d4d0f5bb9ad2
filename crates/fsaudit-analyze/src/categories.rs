//! Files grouped by category and extension.

use std::borrow::Cow;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use fsaudit_core::{FileRecord, format_size};

use crate::aggregator::{AnalysisReport, Aggregator, write_heading};
use crate::classifier::ExtensionClassifier;

/// Count and total size of the files sharing one extension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionStats {
    pub count: u64,
    pub total_size: u64,
}

/// Groups accessible files into category buckets.
///
/// Categories and extensions are kept in the order they were first seen.
#[derive(Debug, Clone)]
pub struct Categorizer {
    classifier: Cow<'static, ExtensionClassifier>,
    buckets: IndexMap<String, IndexMap<String, ExtensionStats>>,
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Categorizer {
    /// Categorize with the built-in extension table.
    pub fn new() -> Self {
        Self {
            classifier: Cow::Borrowed(ExtensionClassifier::builtin()),
            buckets: IndexMap::new(),
        }
    }

    /// Categorize with a custom extension table.
    pub fn with_classifier(classifier: ExtensionClassifier) -> Self {
        Self {
            classifier: Cow::Owned(classifier),
            buckets: IndexMap::new(),
        }
    }

    /// Stats for one `(category, extension)` pair.
    pub fn stats(&self, category: &str, extension: &str) -> Option<ExtensionStats> {
        self.buckets.get(category)?.get(extension).copied()
    }

    /// Check if no file has been categorized.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Build the category report.
    pub fn summarize(&self) -> CategoryReport {
        let categories = self
            .buckets
            .iter()
            .map(|(name, extensions)| {
                let (file_count, total_size) = extensions
                    .values()
                    .fold((0, 0), |(n, s), e| (n + e.count, s + e.total_size));
                CategorySummary {
                    name: name.clone(),
                    extensions: extensions.clone(),
                    file_count,
                    total_size,
                }
            })
            .collect();

        CategoryReport { categories }
    }
}

impl Aggregator for Categorizer {
    fn name(&self) -> &'static str {
        "categories"
    }

    fn add(&mut self, record: &FileRecord) {
        if !record.is_accessible() {
            return;
        }

        let category = self.classifier.classify(record.extension());
        let stats = self
            .buckets
            .entry(category.to_string())
            .or_default()
            .entry(record.extension().to_string())
            .or_default();
        stats.count += 1;
        stats.total_size += record.size();
    }

    fn report(&self) -> AnalysisReport {
        AnalysisReport::Categories(self.summarize())
    }
}

/// One populated category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub name: String,
    /// Extensions seen in this category, `""` for files without one.
    pub extensions: IndexMap<String, ExtensionStats>,
    pub file_count: u64,
    pub total_size: u64,
}

/// Categorization results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub categories: Vec<CategorySummary>,
}

impl CategoryReport {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Look up a category by name.
    pub fn category(&self, name: &str) -> Option<&CategorySummary> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Files counted across every category.
    pub fn total_files(&self) -> u64 {
        self.categories.iter().map(|c| c.file_count).sum()
    }
}

impl fmt::Display for CategoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_heading(f, "File Categories")?;
        if self.is_empty() {
            return writeln!(f, " No files to categorize.");
        }

        for category in &self.categories {
            writeln!(
                f,
                " {:<14} {:>8} files {:>12}",
                category.name,
                category.file_count,
                format_size(category.total_size)
            )?;
            for (extension, stats) in &category.extensions {
                let label = if extension.is_empty() {
                    "(none)"
                } else {
                    extension.as_str()
                };
                writeln!(
                    f,
                    "   {:<12} {:>8} files {:>12}",
                    label,
                    stats.count,
                    format_size(stats.total_size)
                )?;
            }
        }
        Ok(())
    }
}
