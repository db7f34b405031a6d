//! Snapshot capture.
//!
//! The walk is sequential; fingerprinting fans out over a bounded rayon
//! pool and the snapshot is assembled only after every worker has finished,
//! so a snapshot is always a complete cross-section of one capture.

use crate::errors::{ExError, ExErrorKind, IsoGuardError, Result};
use crate::fingerprint::Fingerprinter;
use crate::snapshot::model::{FileRecord, Snapshot};
use crate::{log_op_end, log_op_error, log_op_start};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use walkdir::WalkDir;

/// Tuning for a single capture.
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    /// Fingerprinting threads (minimum 1)
    pub workers: usize,
    /// Abort the capture with `Timeout` once this much time has passed
    pub timeout: Option<Duration>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            timeout: None,
        }
    }
}

enum FileOutcome {
    Recorded(FileRecord),
    Unreadable(String, ExError),
    Failed(ExError),
    DeadlinePassed,
}

/// `/`-joined path of `path` relative to `root`.
fn relative_key(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn check_root(root: &Path) -> Result<()> {
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(IsoGuardError::RootNotDirectory {
            root: root.display().to_string(),
        }
        .into()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(IsoGuardError::RootNotFound {
            root: root.display().to_string(),
        }
        .into()),
        Err(e) => Err(crate::errors::io_error("capture", e).with_path(root.display().to_string())),
    }
}

/// Capture a snapshot of every regular file under `root`.
///
/// Symlinks and directories are not recorded. A file that cannot be read is
/// logged at `warn`, left out of the entries and listed in
/// [`Snapshot::unreadable`]; the capture carries on.
///
/// # Errors
///
/// - `Io` if `root` is missing or not a directory
/// - `Timeout` if `options.timeout` elapses before every file is fingerprinted
/// - `Internal` if the worker pool cannot be built
pub fn capture(
    root: &Path,
    fingerprinter: &dyn Fingerprinter,
    options: &CaptureOptions,
) -> Result<Snapshot> {
    let started = Instant::now();
    let root_label = root.display().to_string();
    log_op_start!("capture", root = %root_label, workers = options.workers);

    match capture_inner(root, fingerprinter, options, started) {
        Ok(snapshot) => {
            log_op_end!(
                "capture",
                duration_ms = started.elapsed().as_millis() as u64,
                root = %root_label,
                file_count = snapshot.len(),
                unreadable_count = snapshot.unreadable().len()
            );
            Ok(snapshot)
        }
        Err(err) => {
            log_op_error!(
                "capture",
                err.clone(),
                duration_ms = started.elapsed().as_millis() as u64,
                root = %root_label
            );
            Err(err)
        }
    }
}

fn timed_out(root: &Path, options: &CaptureOptions) -> ExError {
    IsoGuardError::CaptureTimedOut {
        root: root.display().to_string(),
        timeout_ms: options.timeout.map(|t| t.as_millis() as u64).unwrap_or(0),
    }
    .into()
}

fn capture_inner(
    root: &Path,
    fingerprinter: &dyn Fingerprinter,
    options: &CaptureOptions,
    started: Instant,
) -> Result<Snapshot> {
    check_root(root)?;

    let deadline = options.timeout.map(|t| started + t);
    let past_deadline = || deadline.is_some_and(|d| Instant::now() >= d);
    let mut unreadable = Vec::new();
    let mut files: Vec<(PathBuf, String)> = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        if past_deadline() {
            return Err(timed_out(root, options));
        }
        match entry {
            Ok(entry) if entry.file_type().is_file() => {
                let key = relative_key(root, entry.path());
                files.push((entry.into_path(), key));
            }
            Ok(_) => {}
            Err(err) => {
                let key = err
                    .path()
                    .map(|p| relative_key(root, p))
                    .unwrap_or_default();
                tracing::warn!(
                    component = module_path!(),
                    op = "capture",
                    path = %key,
                    err.code = ExErrorKind::FileUnreadable.code(),
                    "skipping unreadable entry: {}",
                    err
                );
                if !key.is_empty() {
                    unreadable.push(key);
                }
            }
        }
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers.max(1))
        .build()
        .map_err(|e| {
            ExError::new(ExErrorKind::Internal)
                .with_op("capture")
                .with_message(format!("failed to build worker pool: {}", e))
        })?;

    let outcomes: Vec<FileOutcome> = pool.install(|| {
        files
            .par_iter()
            .map(|(path, key)| {
                if past_deadline() {
                    return FileOutcome::DeadlinePassed;
                }
                match fingerprinter.fingerprint(path, key) {
                    Ok(record) => FileOutcome::Recorded(record),
                    Err(err) if err.kind() == ExErrorKind::FileUnreadable => {
                        FileOutcome::Unreadable(key.clone(), err)
                    }
                    Err(err) => FileOutcome::Failed(err),
                }
            })
            .collect()
    });

    // A file that started in time may still finish late.
    if past_deadline() {
        return Err(timed_out(root, options));
    }

    let mut records = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            FileOutcome::Recorded(record) => records.push(record),
            FileOutcome::Unreadable(key, err) => {
                tracing::warn!(
                    component = module_path!(),
                    op = "capture",
                    path = %key,
                    err.code = err.code(),
                    "omitting unreadable file: {}",
                    err.message()
                );
                unreadable.push(key);
            }
            FileOutcome::Failed(err) => return Err(err),
            FileOutcome::DeadlinePassed => return Err(timed_out(root, options)),
        }
    }

    Ok(Snapshot::from_records(
        root.display().to_string(),
        fingerprinter.algorithm(),
        records,
        unreadable,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::Sha256Fingerprinter;
    use tempfile::TempDir;

    #[test]
    fn test_relative_key_uses_forward_slashes() {
        let root = Path::new("/cache");
        let path = root.join("sub").join("file.json");
        assert_eq!(relative_key(root, &path), "sub/file.json");
    }

    #[test]
    fn test_capture_empty_directory() {
        let dir = TempDir::new().unwrap();
        let snap = capture(
            dir.path(),
            &Sha256Fingerprinter::default(),
            &CaptureOptions::default(),
        )
        .unwrap();
        assert!(snap.is_empty());
        assert_eq!(snap.algorithm(), "sha256");
    }

    #[test]
    fn test_missing_root_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = capture(
            &dir.path().join("nope"),
            &Sha256Fingerprinter::default(),
            &CaptureOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Io);
    }

    #[test]
    fn test_zero_timeout_aborts() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"a").unwrap();
        let options = CaptureOptions {
            workers: 1,
            timeout: Some(Duration::ZERO),
        };
        let err = capture(dir.path(), &Sha256Fingerprinter::default(), &options).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Timeout);
    }
}
