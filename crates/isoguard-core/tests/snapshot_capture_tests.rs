//! Snapshot engine tests against real directory trees.

use isoguard_core::errors::{ExError, ExErrorKind, IsoGuardError, Result};
use isoguard_core::fingerprint::{Fingerprinter, Sha256Fingerprinter};
use isoguard_core::snapshot::{capture, CaptureOptions, FileRecord};
use isoguard_core::compute_diff;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn options(workers: usize) -> CaptureOptions {
    CaptureOptions {
        workers,
        timeout: None,
    }
}

fn populate(root: &Path) {
    fs::create_dir_all(root.join("node/a1")).unwrap();
    fs::create_dir_all(root.join("node/b2/deep")).unwrap();
    fs::write(root.join("top.json"), b"{}").unwrap();
    fs::write(root.join("node/a1/result.bin"), b"alpha").unwrap();
    fs::write(root.join("node/b2/deep/result.bin"), b"beta").unwrap();
}

/// Fails on one named file, delegates everything else.
struct FlakyFingerprinter {
    inner: Sha256Fingerprinter,
    locked: &'static str,
}

impl Fingerprinter for FlakyFingerprinter {
    fn algorithm(&self) -> &'static str {
        self.inner.algorithm()
    }

    fn fingerprint(&self, path: &Path, relative_path: &str) -> Result<FileRecord> {
        if relative_path == self.locked {
            return Err(IsoGuardError::FileUnreadable {
                path: path.display().to_string(),
                reason: "file is locked".to_string(),
            }
            .into());
        }
        self.inner.fingerprint(path, relative_path)
    }
}

/// Hashes correctly, but only after `delay`.
struct SlowFingerprinter {
    inner: Sha256Fingerprinter,
    delay: Duration,
}

impl Fingerprinter for SlowFingerprinter {
    fn algorithm(&self) -> &'static str {
        self.inner.algorithm()
    }

    fn fingerprint(&self, path: &Path, relative_path: &str) -> Result<FileRecord> {
        std::thread::sleep(self.delay);
        self.inner.fingerprint(path, relative_path)
    }
}

#[test]
fn test_capture_records_every_regular_file_with_relative_paths() {
    let dir = TempDir::new().unwrap();
    populate(dir.path());

    let snap = capture(dir.path(), &Sha256Fingerprinter::default(), &options(2)).unwrap();

    assert_eq!(
        snap.paths(),
        vec![
            "node/a1/result.bin".to_string(),
            "node/b2/deep/result.bin".to_string(),
            "top.json".to_string(),
        ]
    );
    assert_eq!(snap.get("node/a1/result.bin").unwrap().size, 5);
    assert!(snap.unreadable().is_empty());
}

#[test]
fn test_worker_count_does_not_change_result() {
    let dir = TempDir::new().unwrap();
    populate(dir.path());
    for i in 0..40 {
        fs::write(dir.path().join(format!("f{i}.dat")), format!("{i}")).unwrap();
    }

    let one = capture(dir.path(), &Sha256Fingerprinter::default(), &options(1)).unwrap();
    let many = capture(dir.path(), &Sha256Fingerprinter::default(), &options(8)).unwrap();

    assert_eq!(one.entries(), many.entries());
}

#[test]
fn test_capturing_unmodified_directory_twice_yields_empty_diff() {
    let dir = TempDir::new().unwrap();
    populate(dir.path());

    let first = capture(dir.path(), &Sha256Fingerprinter::default(), &options(4)).unwrap();
    let second = capture(dir.path(), &Sha256Fingerprinter::default(), &options(4)).unwrap();

    let diff = compute_diff(&first, &second).unwrap();
    assert!(diff.is_empty());
    assert_eq!(diff.unchanged, 3);
}

#[test]
fn test_touching_mtime_without_content_change_is_not_a_change() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("a.txt");
    fs::write(&file, b"same").unwrap();
    let before = capture(dir.path(), &Sha256Fingerprinter::default(), &options(1)).unwrap();

    std::thread::sleep(std::time::Duration::from_millis(20));
    fs::write(&file, b"same").unwrap();
    let after = capture(dir.path(), &Sha256Fingerprinter::default(), &options(1)).unwrap();

    assert!(compute_diff(&before, &after).unwrap().is_empty());
}

#[test]
fn test_unreadable_file_is_omitted_not_fatal() {
    let dir = TempDir::new().unwrap();
    populate(dir.path());
    let flaky = FlakyFingerprinter {
        inner: Sha256Fingerprinter::default(),
        locked: "top.json",
    };

    let snap = capture(dir.path(), &flaky, &options(2)).unwrap();

    assert!(snap.get("top.json").is_none());
    assert!(snap.unreadable().contains("top.json"));
    assert_eq!(snap.len(), 2);
}

#[test]
fn test_unreadable_omission_surfaces_as_removed() {
    let dir = TempDir::new().unwrap();
    populate(dir.path());
    let before = capture(dir.path(), &Sha256Fingerprinter::default(), &options(2)).unwrap();
    let flaky = FlakyFingerprinter {
        inner: Sha256Fingerprinter::default(),
        locked: "top.json",
    };
    let after = capture(dir.path(), &flaky, &options(2)).unwrap();

    let diff = compute_diff(&before, &after).unwrap();
    assert_eq!(diff.removed, vec!["top.json"]);
    assert!(after.unreadable().contains("top.json"));
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_not_recorded() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("real.txt"), b"x").unwrap();
    std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("link.txt")).unwrap();

    let snap = capture(dir.path(), &Sha256Fingerprinter::default(), &options(1)).unwrap();

    assert_eq!(snap.paths(), vec!["real.txt".to_string()]);
}

#[test]
fn test_root_that_is_a_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("plain.txt");
    fs::write(&file, b"x").unwrap();

    let err: ExError =
        capture(&file, &Sha256Fingerprinter::default(), &options(1)).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Io);
}

#[test]
fn test_file_finishing_after_deadline_times_out_the_capture() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("only.bin"), b"payload").unwrap();
    let slow = SlowFingerprinter {
        inner: Sha256Fingerprinter::default(),
        delay: Duration::from_millis(400),
    };
    let options = CaptureOptions {
        workers: 1,
        timeout: Some(Duration::from_millis(100)),
    };

    let started = Instant::now();
    let err = capture(dir.path(), &slow, &options).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Timeout);
    assert!(started.elapsed() >= Duration::from_millis(400));
}

#[test]
fn test_slow_fingerprints_within_deadline_succeed() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("only.bin"), b"payload").unwrap();
    let slow = SlowFingerprinter {
        inner: Sha256Fingerprinter::default(),
        delay: Duration::from_millis(20),
    };
    let options = CaptureOptions {
        workers: 1,
        timeout: Some(Duration::from_secs(10)),
    };

    let snap = capture(dir.path(), &slow, &options).unwrap();

    assert_eq!(snap.paths(), vec!["only.bin".to_string()]);
}
