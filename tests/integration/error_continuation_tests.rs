use dupescan::duplicates::{DuplicateFinder, FinderConfig};
use dupescan::executor::{Executor, HashOutcome, HashWork, SequentialExecutor};
use dupescan::scanner::{FileEntry, HashError, ScanError};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::tempdir;

/// Runs sequentially but fails every file whose name starts with `broken`.
struct FlakyExecutor {
    calls: AtomicUsize,
}

impl Executor for FlakyExecutor {
    fn workers(&self) -> usize {
        1
    }

    fn run(&self, tasks: Vec<FileEntry>, work: &HashWork<'_>) -> Vec<HashOutcome> {
        tasks
            .into_iter()
            .map(|file| {
                self.calls.fetch_add(1, Ordering::SeqCst);
                let name = file.path.file_name().unwrap().to_string_lossy().into_owned();
                let result = if name.starts_with("broken") {
                    Err(HashError::PermissionDenied(file.path.clone()))
                } else {
                    work(&file)
                };
                (file, result)
            })
            .collect()
    }
}

#[test]
fn test_hash_failures_become_warnings() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"same").unwrap();
    fs::write(dir.path().join("b.txt"), b"same").unwrap();
    fs::write(dir.path().join("broken1.txt"), b"same").unwrap();
    fs::write(dir.path().join("broken2.txt"), b"other").unwrap();

    let executor = Arc::new(FlakyExecutor {
        calls: AtomicUsize::new(0),
    });
    let config = FinderConfig::default().with_executor(executor.clone());
    let report = DuplicateFinder::new(config).find_duplicates(dir.path()).unwrap();

    assert_eq!(executor.calls.load(Ordering::SeqCst), 4);
    assert_eq!(report.file_groups.len(), 1);
    assert_eq!(report.file_groups[0].len(), 2);
    assert_eq!(report.summary.total_files, 4);
    assert_eq!(report.summary.hashed_files, 2);
    assert_eq!(report.summary.hash_failures(), 2);
    assert_eq!(report.summary.unreadable_entries(), 0);
    for warning in &report.summary.warnings {
        assert!(matches!(
            warning,
            ScanError::HashError(HashError::PermissionDenied(_))
        ));
        assert!(warning
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("broken"));
    }
}

#[test]
fn test_injected_sequential_executor() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"same").unwrap();
    fs::write(dir.path().join("b.txt"), b"same").unwrap();

    let config = FinderConfig::default()
        .with_workers(8)
        .with_executor(Arc::new(SequentialExecutor));
    let report = DuplicateFinder::new(config).find_duplicates(dir.path()).unwrap();

    assert_eq!(report.file_groups.len(), 1);
    assert!(report.summary.warnings.is_empty());
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"same").unwrap();
    fs::write(dir.path().join("b.txt"), b"same").unwrap();
    let locked = dir.path().join("c.txt");
    fs::write(&locked, b"same").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root ignores permission bits.
    if fs::File::open(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
        return;
    }

    let report = DuplicateFinder::with_defaults().find_duplicates(dir.path()).unwrap();

    assert_eq!(report.file_groups.len(), 1);
    assert_eq!(report.file_groups[0].len(), 2);
    assert_eq!(report.summary.hash_failures(), 1);
    assert_eq!(report.summary.warnings[0].path(), locked.canonicalize().unwrap());

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"same").unwrap();
    fs::write(dir.path().join("b.txt"), b"same").unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("c.txt"), b"same").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = DuplicateFinder::with_defaults().find_duplicates(dir.path());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    let report = result.unwrap();

    assert_eq!(report.file_groups.len(), 1);
    assert_eq!(report.file_groups[0].len(), 2);
    assert!(report.summary.unreadable_entries() >= 1);
}

#[test]
fn test_directory_with_hash_failure_is_not_compared() {
    let dir = tempdir().unwrap();
    let dir_a = dir.path().join("dir_a");
    let dir_b = dir.path().join("dir_b");
    fs::create_dir(&dir_a).unwrap();
    fs::create_dir(&dir_b).unwrap();
    fs::write(dir_a.join("x.txt"), b"same").unwrap();
    fs::write(dir_a.join("broken.txt"), b"extra").unwrap();
    fs::write(dir_b.join("x.txt"), b"same").unwrap();

    let executor = Arc::new(FlakyExecutor {
        calls: AtomicUsize::new(0),
    });
    let config = FinderConfig::default().with_executor(executor);
    let report = DuplicateFinder::new(config).find_duplicates(dir.path()).unwrap();

    // dir_a holds one more file than dir_b, so they must not match.
    assert!(report.directory_groups.is_empty());
    assert_eq!(report.summary.incomplete_directories, 1);
    assert_eq!(report.summary.directories_compared, 1);
    assert_eq!(report.file_groups.len(), 1);
    assert_eq!(report.file_groups[0].len(), 2);
}
