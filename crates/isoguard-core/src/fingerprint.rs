//! Streaming content fingerprints.
//!
//! A [`Fingerprinter`] turns one file into a [`FileRecord`]: a hex digest of
//! the file bytes plus size and modification time. Content is read in fixed
//! chunks so peak memory stays bounded regardless of file size.
//!
//! The digest is pluggable: [`StreamingFingerprinter`] is generic over any
//! `sha2::Digest`, and the snapshot engine only sees the trait.

use crate::errors::{IsoGuardError, Result};
use crate::snapshot::model::FileRecord;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256, Sha512};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::marker::PhantomData;
use std::path::Path;

/// Read buffer size used while hashing.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Computes a content fingerprint for a single file.
pub trait Fingerprinter: Send + Sync {
    /// Stable algorithm name recorded on every snapshot.
    fn algorithm(&self) -> &'static str;

    /// Fingerprint the file at `path`, recording it under `relative_path`.
    ///
    /// # Errors
    ///
    /// `FileUnreadable` if the file cannot be opened, stat'ed or read to the end.
    fn fingerprint(&self, path: &Path, relative_path: &str) -> Result<FileRecord>;
}

/// Chunked fingerprinter over any incremental digest.
pub struct StreamingFingerprinter<D> {
    name: &'static str,
    _digest: PhantomData<fn() -> D>,
}

impl<D> StreamingFingerprinter<D> {
    pub const fn with_name(name: &'static str) -> Self {
        Self {
            name,
            _digest: PhantomData,
        }
    }
}

pub type Sha256Fingerprinter = StreamingFingerprinter<Sha256>;
pub type Sha512Fingerprinter = StreamingFingerprinter<Sha512>;

impl Default for Sha256Fingerprinter {
    fn default() -> Self {
        Self::with_name("sha256")
    }
}

impl Default for Sha512Fingerprinter {
    fn default() -> Self {
        Self::with_name("sha512")
    }
}

/// Resolve a fingerprinter by algorithm name.
pub fn fingerprinter_for(algorithm: &str) -> Option<Box<dyn Fingerprinter>> {
    match algorithm {
        "sha256" => Some(Box::new(Sha256Fingerprinter::default())),
        "sha512" => Some(Box::new(Sha512Fingerprinter::default())),
        _ => None,
    }
}

fn unreadable(path: &Path, err: std::io::Error) -> crate::errors::ExError {
    IsoGuardError::FileUnreadable {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
    .into()
}

impl<D> Fingerprinter for StreamingFingerprinter<D>
where
    D: Digest,
{
    fn algorithm(&self) -> &'static str {
        self.name
    }

    fn fingerprint(&self, path: &Path, relative_path: &str) -> Result<FileRecord> {
        let mut file = File::open(path).map_err(|e| unreadable(path, e))?;
        let metadata = file.metadata().map_err(|e| unreadable(path, e))?;

        let mut hasher = D::new();
        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut size: u64 = 0;
        loop {
            let n = match file.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(unreadable(path, e)),
            };
            hasher.update(&buf[..n]);
            size += n as u64;
        }

        // `size` counts bytes actually hashed, so a file growing mid-read
        // still yields a record consistent with its digest.
        let modified_at = metadata.modified().ok().map(DateTime::<Utc>::from);

        Ok(FileRecord {
            path: relative_path.to_string(),
            content_hash: hex::encode(hasher.finalize()),
            size,
            modified_at,
        })
    }
}
