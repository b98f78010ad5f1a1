use dupescan::duplicates::{DuplicateFinder, FinderConfig, ScanReport};
use dupescan::output::DuplicateReport;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn scan(root: &Path) -> ScanReport {
    DuplicateFinder::with_defaults().find_duplicates(root).unwrap()
}

fn directory_sets(report: &ScanReport) -> Vec<BTreeSet<PathBuf>> {
    report
        .directory_groups
        .iter()
        .map(|g| g.directories.iter().map(|d| d.relative_path.clone()).collect())
        .collect()
}

#[test]
fn test_identical_directories_grouped() {
    let dir = tempdir().unwrap();
    write(dir.path(), "dir_a/file1.txt", b"first file");
    write(dir.path(), "dir_a/file2.txt", b"second file");
    write(dir.path(), "dir_b/file1.txt", b"first file");
    write(dir.path(), "dir_b/file2.txt", b"second file");
    write(dir.path(), "dir_c/other.txt", b"unrelated");

    let report = scan(dir.path());

    assert_eq!(report.file_groups.len(), 2);
    assert!(report.file_groups.iter().all(|g| g.len() == 2));

    let sets = directory_sets(&report);
    assert_eq!(sets.len(), 1);
    let expected: BTreeSet<PathBuf> = [PathBuf::from("dir_a"), PathBuf::from("dir_b")].into();
    assert_eq!(sets[0], expected);
    assert_eq!(report.directory_groups[0].id, 1);
    assert_eq!(report.directory_groups[0].file_count, 2);
    assert_eq!(report.summary.duplicate_directory_groups, 1);
}

#[test]
fn test_multiset_counts_repeated_content() {
    let dir = tempdir().unwrap();
    // dir_a holds the same bytes twice, dir_b once plus a different file
    write(dir.path(), "dir_a/x1.txt", b"repeated");
    write(dir.path(), "dir_a/x2.txt", b"repeated");
    write(dir.path(), "dir_b/x1.txt", b"repeated");
    write(dir.path(), "dir_b/y.txt", b"different");

    let report = scan(dir.path());

    assert!(report.directory_groups.is_empty());
    assert_eq!(report.file_groups.len(), 1);
    assert_eq!(report.file_groups[0].len(), 3);
}

#[test]
fn test_set_equal_but_multiset_different() {
    let dir = tempdir().unwrap();
    write(dir.path(), "dir_a/x1.txt", b"repeated");
    write(dir.path(), "dir_a/x2.txt", b"repeated");
    write(dir.path(), "dir_b/x.txt", b"repeated");

    let report = scan(dir.path());

    assert!(report.directory_groups.is_empty());
}

#[test]
fn test_subdirectory_contents_do_not_count() {
    let dir = tempdir().unwrap();
    write(dir.path(), "dir_a/same.txt", b"shared");
    write(dir.path(), "dir_a/nested/extra.txt", b"only in a");
    write(dir.path(), "dir_b/same.txt", b"shared");

    let report = scan(dir.path());

    let sets = directory_sets(&report);
    assert_eq!(sets.len(), 1);
    assert!(sets[0].contains(Path::new("dir_a")));
    assert!(sets[0].contains(Path::new("dir_b")));
}

#[test]
fn test_file_names_do_not_matter() {
    let dir = tempdir().unwrap();
    write(dir.path(), "left/alpha.csv", b"1,2,3");
    write(dir.path(), "right/beta.dat", b"1,2,3");

    let report = scan(dir.path());

    assert_eq!(directory_sets(&report).len(), 1);
}

#[test]
fn test_root_can_match_subdirectory() {
    let dir = tempdir().unwrap();
    write(dir.path(), "top.txt", b"mirrored");
    write(dir.path(), "copy/top.txt", b"mirrored");

    let scan = scan(dir.path());
    let report = DuplicateReport::from_scan(&scan);

    let rows = report.duplicated_directories.unwrap();
    let paths: BTreeSet<String> = rows.iter().map(|r| r.relative_path.clone()).collect();
    assert!(paths.contains("."));
    assert!(paths.contains("copy"));
    assert!(rows.iter().all(|r| r.group_id == 1 && r.group_size == 2));
}

#[test]
fn test_size_filter_applies_to_directories() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a/small.txt", b"tiny");
    write(dir.path(), "b/small.txt", b"tiny");

    let config = FinderConfig::default().with_size_threshold_mb(0.5);
    let report = DuplicateFinder::new(config).find_duplicates(dir.path()).unwrap();

    assert!(report.directory_groups.is_empty());
    assert_eq!(report.summary.directories_compared, 0);
}

#[test]
fn test_several_directory_groups_numbered_in_order() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a1/f.txt", b"first pair");
    write(dir.path(), "a2/f.txt", b"first pair");
    write(dir.path(), "b1/g.txt", b"second pair");
    write(dir.path(), "b2/g.txt", b"second pair");
    write(dir.path(), "b3/g.txt", b"second pair");

    let report = scan(dir.path());

    assert_eq!(report.directory_groups.len(), 2);
    assert_eq!(report.directory_groups[0].id, 1);
    assert_eq!(report.directory_groups[0].len(), 2);
    assert_eq!(report.directory_groups[1].id, 2);
    assert_eq!(report.directory_groups[1].len(), 3);
}
