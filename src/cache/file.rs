//! File Backend Module
//!
//! Persists each record as one file named by the MD5 hex digest of its key.
//! The file holds a JSON [`StoredRecord`]; TTL is checked against its
//! `written_at` stamp.
//!
//! Records are replaced by writing a temporary file in the cache directory
//! and renaming it over the target, so readers never see a partial envelope.
//! Neither the read-modify-write in [`FileBackend::write`] nor the
//! validate-then-read in [`FileBackend::read`] holds a lock: concurrent
//! writers are last-writer-wins, and a writer racing a reader can surface as
//! `CorruptRecord` or a stale read.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::cache::backend::{ensure_key, CacheBackend, DEFAULT_TTL};
use crate::cache::options::CacheOptions;
use crate::cache::record::StoredRecord;
use crate::error::{CacheError, Result};

// == File Backend ==
/// Filesystem-backed cache with per-record TTL.
#[derive(Debug, Clone)]
pub struct FileBackend {
    /// Directory holding one file per record
    directory: PathBuf,
    /// Record lifetime in seconds
    ttl: u64,
}

impl FileBackend {
    // == Constructor ==
    /// Creates a file backend from its options.
    ///
    /// Recognized options: `directory` (required) and `ttl`. The directory
    /// is created, with any missing parents, when it does not exist.
    pub fn new(options: &CacheOptions) -> Result<Self> {
        let ttl = options.u64("ttl")?.unwrap_or(DEFAULT_TTL);
        let raw = options
            .str("directory")?
            .filter(|directory| !directory.is_empty())
            .ok_or(CacheError::MissingOption("directory"))?;
        let directory = normalize_directory(raw);

        if !directory.is_dir() {
            fs::create_dir_all(&directory).map_err(|err| CacheError::Directory {
                path: directory.clone(),
                reason: err.to_string(),
            })?;
            info!(directory = %directory.display(), "created cache directory");
        }

        Ok(Self { directory, ttl })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn ttl(&self) -> u64 {
        self.ttl
    }

    // == Path For ==
    /// Returns the record file path for a key.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.directory
            .join(format!("{:x}", md5::compute(key.as_bytes())))
    }

    /// Loads the envelope currently stored at `path`, if it can be decoded.
    fn load_existing(&self, key: &str, path: &Path) -> Option<StoredRecord> {
        if !path.is_file() {
            return None;
        }

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(key, error = %err, "existing cache record unreadable, replacing");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(key, error = %err, "existing cache record corrupt, replacing");
                None
            }
        }
    }

    fn persist(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.directory)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|err| err.error)?;
        Ok(())
    }
}

impl CacheBackend for FileBackend {
    // == Write ==
    fn write(&self, key: &str, value: Value) -> Result<()> {
        ensure_key(key)?;
        let path = self.path_for(key);

        let record = match self.load_existing(key, &path) {
            Some(existing) => existing.refresh(value),
            None => StoredRecord::new(value),
        };

        let write_error = |reason: String| CacheError::Write {
            key: key.to_string(),
            reason,
        };
        let bytes = serde_json::to_vec(&record).map_err(|err| write_error(err.to_string()))?;
        self.persist(&path, &bytes)
            .map_err(|err| write_error(format!("{}: {}", path.display(), err)))?;

        debug!(key, path = %path.display(), "wrote cache record");
        Ok(())
    }

    // == Read ==
    fn read(&self, key: &str) -> Result<Value> {
        ensure_key(key)?;

        if !self.validate(key) {
            if let Err(err) = self.destroy(key) {
                warn!(key, error = %err, "failed to remove stale cache record");
            }
            debug!(key, "cache miss");
            return Err(CacheError::ExpiredOrMissing(key.to_string()));
        }

        let path = self.path_for(key);
        let bytes =
            fs::read(&path).map_err(|_| CacheError::ExpiredOrMissing(key.to_string()))?;
        let record: StoredRecord =
            serde_json::from_slice(&bytes).map_err(|err| CacheError::CorruptRecord {
                key: key.to_string(),
                reason: err.to_string(),
            })?;

        debug!(key, "cache hit");
        Ok(record.value)
    }

    // == Validate ==
    fn validate(&self, key: &str) -> bool {
        if key.is_empty() {
            return false;
        }

        fs::read(self.path_for(key))
            .ok()
            .and_then(|bytes| serde_json::from_slice::<StoredRecord>(&bytes).ok())
            .is_some_and(|record| !record.is_expired(self.ttl))
    }

    // == Destroy ==
    fn destroy(&self, key: &str) -> Result<()> {
        ensure_key(key)?;
        let path = self.path_for(key);

        if !path.is_file() {
            return Ok(());
        }

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(key, path = %path.display(), "removed cache record");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(CacheError::Delete {
                target: format!("The cache file {}", path.display()),
                reason: err.to_string(),
            }),
        }
    }

    // == Destroy All ==
    fn destroy_all(&self) -> Result<()> {
        if !self.directory.is_dir() {
            return Ok(());
        }

        let removed = self.remove_files_with(|path| fs::remove_file(path))?;

        info!(removed, directory = %self.directory.display(), "cleared file cache");
        Ok(())
    }
}

impl FileBackend {
    /// Removes every plain file directly inside the directory with `remove`,
    /// stopping at the first failure. Files removed before it stay removed.
    fn remove_files_with(
        &self,
        mut remove: impl FnMut(&Path) -> io::Result<()>,
    ) -> Result<usize> {
        let directory_error = |err: io::Error| CacheError::Delete {
            target: format!("The cache directory {}", self.directory.display()),
            reason: err.to_string(),
        };

        let mut removed = 0usize;
        for entry in fs::read_dir(&self.directory).map_err(directory_error)? {
            let entry = entry.map_err(directory_error)?;
            if entry.file_type().map(|kind| kind.is_dir()).unwrap_or(false) {
                continue;
            }

            let path = entry.path();
            match remove(&path) {
                Ok(()) => removed += 1,
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(CacheError::Delete {
                        target: format!("The cache file {}", path.display()),
                        reason: err.to_string(),
                    })
                }
            }
        }

        Ok(removed)
    }
}

/// Strips trailing separators, keeping a bare root intact.
fn normalize_directory(raw: &str) -> PathBuf {
    let trimmed = raw.trim_end_matches(|c| c == '/' || c == MAIN_SEPARATOR);
    if trimmed.is_empty() {
        PathBuf::from(&raw[..1])
    } else {
        PathBuf::from(trimmed)
    }
}
