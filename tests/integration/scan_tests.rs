use dupescan::duplicates::{find_duplicates, DuplicateFinder, FinderConfig, ScanReport};
use dupescan::scanner::Hasher;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const CONTENT: &[u8] = b"This is some test content.";

fn write(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Group membership as sets of relative paths, independent of group ids.
fn membership(report: &ScanReport) -> BTreeSet<BTreeSet<PathBuf>> {
    report
        .file_groups
        .iter()
        .map(|g| g.files.iter().map(|f| f.relative_path.clone()).collect())
        .collect()
}

fn scan(root: &Path, config: FinderConfig) -> ScanReport {
    DuplicateFinder::new(config).find_duplicates(root).unwrap()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();

    let report = scan(dir.path(), FinderConfig::default());

    assert!(report.file_groups.is_empty());
    assert!(report.directory_groups.is_empty());
    assert_eq!(report.summary.total_files, 0);
    assert!(!report.has_duplicates());
}

#[test]
fn test_three_copies_and_one_unique() {
    let dir = tempdir().unwrap();
    write(dir.path(), "file1.txt", CONTENT);
    write(dir.path(), "file2.txt", CONTENT);
    write(dir.path(), "subdir/file3.txt", CONTENT);
    write(dir.path(), "unique.txt", b"Something else entirely.");

    let report = scan(dir.path(), FinderConfig::default());

    assert_eq!(report.file_groups.len(), 1);
    let group = &report.file_groups[0];
    assert_eq!(group.id, 1);
    assert_eq!(group.len(), 3);
    assert_eq!(group.size, CONTENT.len() as u64);
    assert_eq!(group.extensions, vec!["txt"]);

    let members: BTreeSet<PathBuf> = group.files.iter().map(|f| f.relative_path.clone()).collect();
    assert!(members.contains(Path::new("file1.txt")));
    assert!(members.contains(Path::new("file2.txt")));
    assert!(members.contains(&Path::new("subdir").join("file3.txt")));
    assert!(!members.contains(Path::new("unique.txt")));

    assert_eq!(report.summary.total_files, 4);
    assert_eq!(report.summary.duplicate_files, 2);
    assert_eq!(report.summary.reclaimable_space, 2 * CONTENT.len() as u64);
}

#[test]
fn test_group_spans_extensions() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.csv", CONTENT);
    write(dir.path(), "b.TXT", CONTENT);
    write(dir.path(), "c", CONTENT);

    let report = scan(dir.path(), FinderConfig::default());

    assert_eq!(report.file_groups.len(), 1);
    assert_eq!(report.file_groups[0].len(), 3);
    assert_eq!(report.file_groups[0].extensions, vec!["", "csv", "txt"]);
}

#[test]
fn test_extension_filter_keeps_only_matching_duplicates() {
    let dir = tempdir().unwrap();
    write(dir.path(), "one.csv", b"a,b\n1,2\n");
    write(dir.path(), "two.csv", b"a,b\n1,2\n");
    write(dir.path(), "one.txt", b"plain text");
    write(dir.path(), "two.txt", b"plain text");

    let config = FinderConfig::default().with_extensions(vec!["csv".to_string()]);
    let report = scan(dir.path(), config);

    assert_eq!(report.file_groups.len(), 1);
    for file in &report.file_groups[0].files {
        assert_eq!(file.extension, "csv");
    }
    assert_eq!(report.summary.total_files, 2);
}

#[test]
fn test_extension_filter_is_case_insensitive() {
    let dir = tempdir().unwrap();
    write(dir.path(), "upper.CSV", CONTENT);
    write(dir.path(), "lower.csv", CONTENT);

    let config = FinderConfig::default().with_extensions(vec![".Csv".to_string()]);
    let report = scan(dir.path(), config);

    assert_eq!(report.file_groups.len(), 1);
    assert_eq!(report.file_groups[0].len(), 2);
}

#[test]
fn test_size_threshold_above_all_files_finds_nothing() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.bin", CONTENT);
    write(dir.path(), "b.bin", CONTENT);

    let config = FinderConfig::default().with_size_threshold_mb(1.0);
    let report = scan(dir.path(), config);

    assert!(!report.has_duplicates());
    assert_eq!(report.summary.total_files, 0);
}

#[test]
fn test_size_threshold_keeps_large_files() {
    let dir = tempdir().unwrap();
    let big = vec![7u8; 1024 * 1024 + 10];
    write(dir.path(), "big1.bin", &big);
    write(dir.path(), "big2.bin", &big);
    write(dir.path(), "small1.bin", CONTENT);
    write(dir.path(), "small2.bin", CONTENT);

    let config = FinderConfig::default().with_size_threshold_mb(1.0);
    let report = scan(dir.path(), config);

    assert_eq!(report.file_groups.len(), 1);
    assert_eq!(report.file_groups[0].size, big.len() as u64);
    for file in &report.file_groups[0].files {
        assert!(file.size >= 1024 * 1024);
    }
}

#[test]
fn test_parallel_matches_sequential() {
    let dir = tempdir().unwrap();
    for g in 0..5 {
        let content = format!("group {g} content");
        for m in 0..3 {
            write(dir.path(), &format!("d{m}/g{g}_m{m}.dat"), content.as_bytes());
        }
    }
    write(dir.path(), "lonely.dat", b"no twin");

    let sequential = scan(dir.path(), FinderConfig::default().with_workers(1));
    let parallel = scan(dir.path(), FinderConfig::default().with_workers(2));

    assert_eq!(sequential.file_groups.len(), 5);
    assert!(sequential.file_groups.iter().all(|g| g.len() == 3));
    assert_eq!(membership(&sequential), membership(&parallel));

    // Walk order is sorted and executors keep task order, so ids match too.
    let ids = |r: &ScanReport| -> Vec<(usize, Vec<PathBuf>)> {
        r.file_groups
            .iter()
            .map(|g| (g.id, g.files.iter().map(|f| f.relative_path.clone()).collect()))
            .collect()
    };
    assert_eq!(ids(&sequential), ids(&parallel));
}

#[test]
fn test_rescan_is_idempotent() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a/x.txt", CONTENT);
    write(dir.path(), "b/x.txt", CONTENT);
    write(dir.path(), "b/y.txt", b"other");
    write(dir.path(), "c/y.txt", b"other");

    let first = scan(dir.path(), FinderConfig::default().with_workers(3));
    let second = scan(dir.path(), FinderConfig::default().with_workers(3));

    assert_eq!(first.file_groups.len(), 2);
    assert_eq!(membership(&first), membership(&second));
}

#[test]
fn test_empty_files_need_opt_in() {
    let dir = tempdir().unwrap();
    write(dir.path(), "empty1", b"");
    write(dir.path(), "empty2", b"");

    let skipped = scan(dir.path(), FinderConfig::default());
    assert!(skipped.file_groups.is_empty());

    let included = scan(dir.path(), FinderConfig::default().with_include_empty(true));
    assert_eq!(included.file_groups.len(), 1);
    assert_eq!(included.file_groups[0].size, 0);
}

#[test]
fn test_skip_hidden() {
    let dir = tempdir().unwrap();
    // tempdir names start with a dot, so scan a plain child
    let root = dir.path().join("data");
    write(&root, "visible.txt", CONTENT);
    write(&root, ".hidden.txt", CONTENT);
    write(&root, ".cache/visible.txt", CONTENT);

    let all = scan(&root, FinderConfig::default());
    assert_eq!(all.file_groups.len(), 1);
    assert_eq!(all.file_groups[0].len(), 3);

    let visible = scan(&root, FinderConfig::default().with_skip_hidden(true));
    assert!(visible.file_groups.is_empty());
    assert_eq!(visible.summary.total_files, 1);
}

#[test]
fn test_mmap_hashing_agrees_with_buffered() {
    let dir = tempdir().unwrap();
    let big: Vec<u8> = (0..3 * 1024 * 1024).map(|i| (i % 251) as u8).collect();
    write(dir.path(), "big_a.bin", &big);
    write(dir.path(), "big_b.bin", &big);

    let buffered = scan(dir.path(), FinderConfig::default());
    let mapped = scan(dir.path(), FinderConfig::default().with_mmap(true));
    assert_eq!(buffered.file_groups.len(), 1);
    assert_eq!(buffered.file_groups[0].hash, mapped.file_groups[0].hash);

    let streaming = Hasher::new().full_hash(&dir.path().join("big_a.bin")).unwrap();
    let forced_map = Hasher::new()
        .with_mmap(true)
        .with_mmap_threshold(1)
        .full_hash(&dir.path().join("big_a.bin"))
        .unwrap();
    assert_eq!(streaming, forced_map);
    assert_eq!(streaming, buffered.file_groups[0].hash);
}

#[test]
fn test_free_function_returns_tables() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a/one.csv", CONTENT);
    write(dir.path(), "b/one.csv", CONTENT);

    let report = find_duplicates(dir.path(), 0.0, Some(vec!["csv".to_string()]), 2, false).unwrap();

    let files = report.duplicated_files.as_ref().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].group_id, 1);
    assert_eq!(files[0].count, 2);
    assert_eq!(files[0].size_bytes, CONTENT.len() as u64);
    assert_eq!(files[0].fingerprint.len(), 64);

    let dirs = report.duplicated_directories.as_ref().unwrap();
    assert_eq!(dirs.len(), 2);
    assert!(dirs.iter().all(|d| d.group_id == 1 && d.group_size == 2 && d.file_count == 1));
}

#[test]
fn test_free_function_no_duplicates() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"one");
    write(dir.path(), "b.txt", b"two");

    let report = find_duplicates(dir.path(), 0.0, None, 1, false).unwrap();

    assert!(!report.has_findings());
    assert!(report.duplicated_files.is_none());
    assert!(report.duplicated_directories.is_none());
}
