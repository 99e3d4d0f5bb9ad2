use fsaudit_analyze::{
    Aggregator, AnalysisReport, Audit, AuditConfig, Categorizer, DeleteMode, DeletionStatus,
    ExtensionClassifier, LARGE_FILES_PROMPT, LargeFileFinder, PERMISSIONS_PROMPT, Purge,
    StatisticsCollector,
};
use fsaudit_core::{Decline, ScanError, SizeParseError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const KIB: usize = 1024;
const MIB: usize = 1024 * 1024;

fn audit_of(root: &Path, threshold: &str) -> Audit {
    let config = AuditConfig::builder()
        .root(root)
        .size_threshold(threshold)
        .build()
        .unwrap();
    let mut audit = Audit::new(&config).unwrap();
    audit.run();
    audit
}

#[test]
fn test_empty_directory_reports_nothing() {
    let temp = TempDir::new().unwrap();
    let audit = audit_of(temp.path(), "1 MiB");
    let report = audit.report();

    assert!(report.categories.is_empty());
    assert!(report.permissions.is_empty());
    assert!(report.large_files.is_empty());
    assert_eq!(report.statistics.total_files, 0);
    assert_eq!(report.statistics.smallest, 0);
    assert_eq!(report.statistics.average_size, 0.0);

    let text = report.to_string();
    assert!(text.contains("No files to categorize."));
    assert!(text.contains("No files with bad permissions found."));
    assert!(text.contains("No large files found."));
}

#[test]
fn test_malformed_threshold_fails_before_scanning() {
    let temp = TempDir::new().unwrap();
    let config = AuditConfig::builder()
        .root(temp.path())
        .size_threshold("1 KiBb")
        .build()
        .unwrap();

    let err = Audit::new(&config).unwrap_err();
    assert!(matches!(
        err,
        ScanError::InvalidThreshold(SizeParseError::UnknownUnit { .. })
    ));
    assert!(err.to_string().contains("KiBb"));
}

#[test]
fn test_threshold_boundary_through_walk() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("exact.bin"), vec![0u8; KIB]).unwrap();
    fs::write(temp.path().join("under.bin"), vec![0u8; KIB - 1]).unwrap();

    let audit = audit_of(temp.path(), "1 KiB");
    let entries = audit.large_files().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].path, temp.path().join("exact.bin"));
}

#[test]
fn test_large_files_sorted_regardless_of_walk_order() {
    let temp = TempDir::new().unwrap();
    for (dir, size) in [("c", 7), ("a", 3), ("b", 9), ("d", 1), ("e", 5)] {
        let sub = temp.path().join(dir);
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("blob"), vec![0u8; size * KIB]).unwrap();
    }

    let audit = audit_of(temp.path(), "2 KiB");
    let sizes: Vec<u64> = audit.large_files().entries().iter().map(|e| e.size).collect();
    assert_eq!(sizes, [3, 5, 7, 9].map(|s| (s * KIB) as u64));
}

#[test]
fn test_reports_are_repeatable() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("one.txt"), "1").unwrap();
    fs::write(temp.path().join("two.png"), "22").unwrap();

    let audit = audit_of(temp.path(), "1");
    let first = audit.report();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let second = audit.report();

    assert_eq!(first.categories, second.categories);
    assert_eq!(first.permissions, second.permissions);
    assert_eq!(first.large_files, second.large_files);
    assert_eq!(first.statistics, second.statistics);
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn test_every_aggregator_through_trait_objects() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("song.flac");
    fs::write(&path, vec![0u8; 2 * KIB]).unwrap();

    let mut aggregators: Vec<Box<dyn Aggregator>> = vec![
        Box::new(Categorizer::new()),
        Box::new(LargeFileFinder::new(KIB as u64)),
        Box::new(StatisticsCollector::new()),
    ];
    for aggregator in &mut aggregators {
        aggregator.add_path(&path);
        aggregator.add_path(&temp.path().join("missing.flac"));
    }

    for aggregator in &aggregators {
        match aggregator.report() {
            AnalysisReport::Categories(report) => {
                assert_eq!(report.category("Audio").unwrap().file_count, 1);
            }
            AnalysisReport::LargeFiles(report) => assert_eq!(report.entries.len(), 1),
            AnalysisReport::Statistics(report) => assert_eq!(report.total_files, 1),
            AnalysisReport::Permissions(_) => unreachable!(),
        }
    }
}

#[test]
fn test_custom_categories_file() {
    let temp = TempDir::new().unwrap();
    let table = temp.path().join("categories.json");
    fs::write(&table, r#"{"Config": [".json", ".toml"]}"#).unwrap();
    let data = temp.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("Cargo.toml"), "[package]").unwrap();
    fs::write(data.join("notes.txt"), "hi").unwrap();

    let config = AuditConfig::builder()
        .root(&data)
        .categories_file(&table)
        .build()
        .unwrap();
    let mut audit = Audit::new(&config).unwrap();
    audit.run();

    let report = audit.report().categories;
    assert_eq!(report.category("Config").unwrap().file_count, 1);
    assert_eq!(report.category("Other").unwrap().file_count, 1);
    assert!(report.category("Text").is_none());
}

#[test]
fn test_invalid_categories_file() {
    let temp = TempDir::new().unwrap();
    let table = temp.path().join("categories.json");
    fs::write(&table, "not json").unwrap();

    let config = AuditConfig::builder()
        .root(temp.path())
        .categories_file(&table)
        .build()
        .unwrap();
    assert!(matches!(Audit::new(&config), Err(ScanError::Config(_))));
    assert!(ExtensionClassifier::from_json_file(&table).is_err());
}

#[test]
fn test_report_serializes_to_json() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.csv"), "x,y").unwrap();

    let audit = audit_of(temp.path(), "1 MiB");
    let json = serde_json::to_value(audit.report()).unwrap();

    assert_eq!(json["statistics"]["total_files"], 1);
    assert_eq!(json["categories"]["categories"][0]["name"], "Spreadsheet");
    assert_eq!(json["large_files"]["threshold"], MIB as u64);
    assert_eq!(json["scan"]["walk"]["files_yielded"], 1);
}

#[test]
fn test_batch_purge_declined_keeps_files() {
    let temp = TempDir::new().unwrap();
    let big = temp.path().join("big.bin");
    fs::write(&big, vec![0u8; 4 * KIB]).unwrap();

    let audit = audit_of(temp.path(), "1 KiB");
    let outcome = audit.purge(DeleteMode::Batch, &mut Decline);

    assert!(outcome.large_files.is_none());
    assert!(big.exists());
}

#[test]
fn test_one_by_one_purge_asks_per_file() {
    let temp = TempDir::new().unwrap();
    let keep = temp.path().join("keep.iso");
    let remove = temp.path().join("remove.iso");
    fs::write(&keep, vec![0u8; 2 * KIB]).unwrap();
    fs::write(&remove, vec![0u8; 3 * KIB]).unwrap();

    let audit = audit_of(temp.path(), "1 KiB");
    let mut prompts = Vec::new();
    let mut confirm = |prompt: &str| {
        prompts.push(prompt.to_string());
        prompt.contains("remove.iso")
    };
    let outcome = audit.purge(DeleteMode::OneByOne, &mut confirm);

    assert!(prompts.iter().all(|p| p != LARGE_FILES_PROMPT));
    let report = outcome.large_files.unwrap();
    assert_eq!(report.deleted(), 1);
    assert_eq!(report.skipped(), 1);
    assert!(keep.exists());
    assert!(!remove.exists());
}

#[cfg(unix)]
mod unix {
    use super::*;
    use std::os::unix::fs::{PermissionsExt, symlink};

    fn write_with_mode(path: &Path, len: usize, mode: u32) {
        fs::write(path, vec![b'x'; len]).unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
    }

    #[test]
    fn test_reference_scenario() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write_with_mode(&root.join("small.txt"), 100, 0o644);
        write_with_mode(&root.join("medium.dat"), 100 * KIB, 0o444);
        write_with_mode(&root.join("huge.mp4"), 10 * MIB, 0o777);

        let audit = audit_of(root, "1 MiB");
        let report = audit.report();

        assert_eq!(report.large_files.entries.len(), 1);
        assert_eq!(report.large_files.entries[0].path, root.join("huge.mp4"));

        assert_eq!(report.permissions.flagged.len(), 1);
        assert_eq!(report.permissions.flagged[0].path, root.join("huge.mp4"));
        assert_eq!(report.permissions.flagged[0].pattern.as_str(), "rwxrwxrwx");

        let stats = &report.statistics;
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.total_size, (100 + 100 * KIB + 10 * MIB) as u64);
        assert_eq!(stats.smallest, 100);
        assert_eq!(stats.largest, (10 * MIB) as u64);

        assert_eq!(report.categories.total_files(), 3);
        assert_eq!(report.categories.category("Video").unwrap().file_count, 1);
        assert_eq!(report.categories.category("System").unwrap().file_count, 1);
    }

    #[test]
    fn test_batch_purge_order_and_independence() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write_with_mode(&root.join("open.sh"), 10, 0o777);
        write_with_mode(&root.join("big.bin"), 2 * KIB, 0o644);

        let audit = audit_of(root, "1 KiB");
        let mut prompts = Vec::new();
        let mut confirm = |prompt: &str| {
            prompts.push(prompt.to_string());
            true
        };
        let outcome = audit.purge(DeleteMode::Batch, &mut confirm);

        assert_eq!(prompts, [PERMISSIONS_PROMPT, LARGE_FILES_PROMPT]);
        assert_eq!(outcome.permissions.unwrap().deleted(), 1);
        assert_eq!(outcome.large_files.unwrap().deleted(), 1);
        assert!(!root.join("open.sh").exists());
        assert!(!root.join("big.bin").exists());
    }

    #[test]
    fn test_failed_deletion_does_not_stop_batch() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write_with_mode(&root.join("a.bin"), 2 * KIB, 0o644);
        write_with_mode(&root.join("b.bin"), 3 * KIB, 0o644);

        let audit = audit_of(root, "1 KiB");
        fs::remove_file(root.join("a.bin")).unwrap();

        let report = audit.large_files().delete_flagged();
        assert_eq!(report.outcomes.len(), 2);
        assert!(matches!(report.outcomes[0].status, DeletionStatus::Failed(_)));
        assert_eq!(report.outcomes[1].status, DeletionStatus::Deleted);
        assert!(!root.join("b.bin").exists());
    }

    #[test]
    fn test_directory_link_ignored_when_not_following() {
        let outside = TempDir::new().unwrap();
        fs::set_permissions(outside.path(), fs::Permissions::from_mode(0o777)).unwrap();
        write_with_mode(&outside.path().join("inner.bin"), 4 * KIB, 0o777);

        let temp = TempDir::new().unwrap();
        symlink(outside.path(), temp.path().join("linked")).unwrap();

        let config = AuditConfig::builder()
            .root(temp.path())
            .size_threshold("1")
            .follow_symlinks(false)
            .build()
            .unwrap();
        let mut audit = Audit::new(&config).unwrap();
        audit.run();
        let report = audit.report();

        assert_eq!(report.statistics.total_files, 0);
        assert_eq!(report.statistics.total_size, 0);
        assert!(report.permissions.is_empty());
        assert!(report.large_files.is_empty());
        assert!(report.categories.is_empty());
    }

    #[test]
    fn test_directory_link_walked_when_following() {
        let outside = TempDir::new().unwrap();
        write_with_mode(&outside.path().join("inner.bin"), 4 * KIB, 0o777);

        let temp = TempDir::new().unwrap();
        let root = temp.path();
        symlink(outside.path(), root.join("linked")).unwrap();

        let audit = audit_of(root, "1 KiB");
        let report = audit.report();

        assert_eq!(report.statistics.total_files, 1);
        assert_eq!(report.permissions.flagged.len(), 1);
        assert_eq!(report.permissions.flagged[0].path, root.join("linked/inner.bin"));
        assert_eq!(report.large_files.entries.len(), 1);
    }

    #[test]
    fn test_nothing_flagged_is_not_offered() {
        let temp = TempDir::new().unwrap();
        write_with_mode(&temp.path().join("plain.txt"), 10, 0o644);

        let audit = audit_of(temp.path(), "1 MiB");
        let mut asked = false;
        let mut confirm = |_: &str| {
            asked = true;
            true
        };
        let outcome = audit.purge(DeleteMode::Batch, &mut confirm);

        assert!(!asked);
        assert!(outcome.permissions.is_none());
        assert!(outcome.large_files.is_none());
    }
}
