//! Running size statistics.

use std::cell::Cell;
use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use fsaudit_core::{FileRecord, format_size};

use crate::aggregator::{AnalysisReport, Aggregator, write_heading};

/// Count, total and extremes of file sizes, plus elapsed time.
#[derive(Debug, Clone)]
pub struct StatisticsCollector {
    total_files: u64,
    total_size: u64,
    smallest: u64,
    largest: u64,
    started: Instant,
    // Captured by the first report after the latest add.
    elapsed: Cell<Option<Duration>>,
}

impl Default for StatisticsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl StatisticsCollector {
    /// Start collecting. Elapsed time is measured from here.
    pub fn new() -> Self {
        Self {
            total_files: 0,
            total_size: 0,
            smallest: u64::MAX,
            largest: 0,
            started: Instant::now(),
            elapsed: Cell::new(None),
        }
    }

    pub fn total_files(&self) -> u64 {
        self.total_files
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    fn elapsed(&self) -> Duration {
        match self.elapsed.get() {
            Some(elapsed) => elapsed,
            None => {
                let elapsed = self.started.elapsed();
                self.elapsed.set(Some(elapsed));
                elapsed
            }
        }
    }

    /// Build the statistics report.
    pub fn summarize(&self) -> StatisticsReport {
        let elapsed = self.elapsed();
        if self.total_files == 0 {
            return StatisticsReport {
                elapsed,
                ..StatisticsReport::default()
            };
        }

        StatisticsReport {
            total_files: self.total_files,
            total_size: self.total_size,
            average_size: self.total_size as f64 / self.total_files as f64,
            smallest: self.smallest,
            largest: self.largest,
            elapsed,
        }
    }
}

impl Aggregator for StatisticsCollector {
    fn name(&self) -> &'static str {
        "statistics"
    }

    fn add(&mut self, record: &FileRecord) {
        if !record.is_accessible() {
            return;
        }

        let size = record.size();
        self.total_files += 1;
        self.total_size = self.total_size.saturating_add(size);
        self.smallest = self.smallest.min(size);
        self.largest = self.largest.max(size);
        self.elapsed.set(None);
    }

    fn report(&self) -> AnalysisReport {
        AnalysisReport::Statistics(self.summarize())
    }
}

/// Size statistics over every accessible file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub total_files: u64,
    pub total_size: u64,
    pub average_size: f64,
    pub smallest: u64,
    pub largest: u64,
    pub elapsed: Duration,
}

impl fmt::Display for StatisticsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_heading(f, "File Statistics")?;
        writeln!(f, " Total files:   {:>14}", self.total_files)?;
        writeln!(f, " Total size:    {:>14}", format_size(self.total_size))?;
        writeln!(
            f,
            " Average size:  {:>14}",
            format_size(self.average_size as u64)
        )?;
        writeln!(f, " Smallest file: {:>14}", format_size(self.smallest))?;
        writeln!(f, " Largest file:  {:>14}", format_size(self.largest))?;
        writeln!(
            f,
            " Elapsed:       {:>13.2}s",
            self.elapsed.as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn record(size: u64) -> FileRecord {
        FileRecord::from_parts("/f", size, None)
    }

    #[test]
    fn test_empty_report_is_all_zero() {
        let report = StatisticsCollector::new().summarize();
        assert_eq!(report.total_files, 0);
        assert_eq!(report.total_size, 0);
        assert_eq!(report.average_size, 0.0);
        assert_eq!(report.smallest, 0);
        assert_eq!(report.largest, 0);
    }

    #[test]
    fn test_running_totals() {
        let mut stats = StatisticsCollector::new();
        for size in [100, 300, 50] {
            stats.add(&record(size));
        }
        stats.add(&FileRecord::inaccessible("/gone", io::ErrorKind::NotFound));

        let report = stats.summarize();
        assert_eq!(report.total_files, 3);
        assert_eq!(report.total_size, 450);
        assert_eq!(report.average_size, 150.0);
        assert_eq!(report.smallest, 50);
        assert_eq!(report.largest, 300);
    }

    #[test]
    fn test_zero_byte_file_is_smallest() {
        let mut stats = StatisticsCollector::new();
        stats.add(&record(0));
        stats.add(&record(10));
        assert_eq!(stats.summarize().smallest, 0);
    }

    #[test]
    fn test_repeated_reports_are_identical() {
        let mut stats = StatisticsCollector::new();
        stats.add(&record(7));

        let first = stats.summarize();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(stats.summarize(), first);

        stats.add(&record(9));
        std::thread::sleep(Duration::from_millis(5));
        let after_add = stats.summarize();
        assert!(after_add.elapsed > first.elapsed);
    }

    #[test]
    fn test_report_text() {
        let mut stats = StatisticsCollector::new();
        stats.add(&record(1024 * 1024));
        let text = stats.summarize().to_string();
        assert!(text.contains("Total files:"));
        assert!(text.contains("1.00 MiB"));
    }
}
