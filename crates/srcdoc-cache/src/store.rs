//! File-based cache store.
//!
//! [`CacheStore`] keeps one file per [`Fingerprint`] directly under its root:
//!
//! ```text
//! {root}/
//! +-- 3f2a...9c   # rendered bytes for one fingerprint
//! +-- 81d0...4e
//! ```
//!
//! There are no sidecar files. Entry size and last access come from filesystem
//! metadata. Entries are written to a temporary file and then moved into place
//! without overwriting, so concurrent readers never observe a partial entry and
//! the first writer of a key wins.
//!
//! Several processes may share one root. Every directory listing is treated
//! as a stale snapshot: entries that vanish between listing and use are
//! skipped, never reported as errors. Readers hold an open handle from
//! [`CacheStore::open_entry`], which stays readable after another process
//! evicts the entry.

use std::fs::{self, File, FileTimes};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tempfile::NamedTempFile;

use crate::{CacheError, Fingerprint};

/// Prefix of in-flight temporary files inside the cache root.
const STAGING_PREFIX: &str = ".staging-";

/// Cache of rendered output rooted at a directory on disk.
#[derive(Debug)]
pub struct CacheStore {
    root: PathBuf,
    max_size: u64,
}

/// Summary of the entries currently in a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries.
    pub entries: usize,
    /// Sum of entry sizes in bytes.
    pub total_bytes: u64,
}

/// Outcome of an eviction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvictionReport {
    /// Entries deleted by this pass.
    pub removed: usize,
    /// Bytes no longer held by the store, including entries that vanished
    /// concurrently.
    pub freed_bytes: u64,
    /// Total size of the entries left behind.
    pub remaining_bytes: u64,
}

/// A listed entry with the metadata eviction orders by.
#[derive(Debug)]
struct Entry {
    path: PathBuf,
    size: u64,
    accessed: SystemTime,
}

impl CacheStore {
    /// Open the store at `root`, creating the directory if needed.
    ///
    /// The root must be readable and writable. Writability is checked by
    /// creating and removing a temporary file.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Unavailable`] if the directory cannot be created,
    /// listed or written to. Callers are expected to continue uncached.
    pub fn open(root: PathBuf, max_size: u64) -> Result<Self, CacheError> {
        let unavailable = |source| CacheError::Unavailable {
            path: root.clone(),
            source,
        };

        fs::create_dir_all(&root).map_err(unavailable)?;
        fs::read_dir(&root).map_err(unavailable)?;
        tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempfile_in(&root)
            .map_err(unavailable)?;

        tracing::debug!(root = %root.display(), max_size, "cache store opened");
        Ok(Self { root, max_size })
    }

    /// Cache root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Configured size ceiling in bytes.
    #[must_use]
    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Location of the entry for `key`, whether or not it exists.
    #[must_use]
    pub fn entry_path(&self, key: &Fingerprint) -> PathBuf {
        self.root.join(key.to_hex())
    }

    /// Path of the cached output for `key`, if present.
    #[must_use]
    pub fn lookup(&self, key: &Fingerprint) -> Option<PathBuf> {
        let path = self.entry_path(key);
        path.is_file().then_some(path)
    }

    /// Open the cached output for `key` and mark it as just accessed.
    ///
    /// Returns `None` when there is no entry, including one evicted by another
    /// process a moment ago. Many filesystems do not update access times on
    /// read (`noatime`, `relatime`), so the access time is refreshed
    /// explicitly; failing to do so is not an error.
    #[must_use]
    pub fn open_entry(&self, key: &Fingerprint) -> Option<File> {
        let path = self.entry_path(key);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %path.display(), "failed to open cache entry: {e}");
                return None;
            }
        };
        if let Err(e) = file.set_times(FileTimes::new().set_accessed(SystemTime::now())) {
            tracing::debug!(path = %path.display(), "failed to refresh access time: {e}");
        }
        Some(file)
    }

    /// Create a temporary file inside the root for an entry being produced.
    ///
    /// Dropping the returned [`StagedEntry`] without committing removes it.
    pub fn stage(&self) -> Result<StagedEntry<'_>, CacheError> {
        let file = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempfile_in(&self.root)?;
        Ok(StagedEntry { store: self, file })
    }

    /// Store the bytes read from `source` under `key`.
    ///
    /// If the entry already exists this is a no-op and the existing path is
    /// returned; identical fingerprints imply identical content.
    pub fn insert(&self, key: &Fingerprint, source: &mut impl Read) -> Result<PathBuf, CacheError> {
        if let Some(existing) = self.lookup(key) {
            return Ok(existing);
        }
        let mut staged = self.stage()?;
        io::copy(source, staged.file.as_file_mut())?;
        staged.commit(key)
    }

    /// Move a finished temporary file into the store as the entry for `key`.
    ///
    /// Never overwrites: if another writer stored the same key first, `file`
    /// is discarded and the existing entry's path is returned. A file on
    /// another filesystem is copied into the root instead of renamed.
    pub fn persist(&self, key: &Fingerprint, file: NamedTempFile) -> Result<PathBuf, CacheError> {
        let target = self.entry_path(key);
        match file.persist_noclobber(&target) {
            Ok(_) => {
                tracing::debug!(key = %key, "cache entry stored");
                Ok(target)
            }
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                tracing::debug!(key = %key, "cache entry already present, keeping existing");
                Ok(target)
            }
            Err(e) if e.error.kind() == io::ErrorKind::CrossesDevices => {
                tracing::debug!(key = %key, "output is on another filesystem, copying");
                let mut source = e.file.reopen()?;
                self.insert(key, &mut source)
            }
            Err(e) => Err(CacheError::Io(e.error)),
        }
    }

    /// Evict entries with the configured ceiling.
    pub fn prune(&self) -> EvictionReport {
        self.evict(self.max_size)
    }

    /// Delete least-recently-accessed entries until the total size is at most
    /// `ceiling` or no entries remain.
    ///
    /// Deletion failures are logged and skipped. An entry removed by another
    /// process in the meantime counts as freed.
    pub fn evict(&self, ceiling: u64) -> EvictionReport {
        match self.list() {
            Ok(entries) => evict_entries(entries, ceiling),
            Err(e) => {
                tracing::warn!(root = %self.root.display(), "failed to list cache: {e}");
                EvictionReport::default()
            }
        }
    }

    /// Count entries and their total size.
    pub fn stats(&self) -> Result<CacheStats, CacheError> {
        let entries = self.list()?;
        Ok(CacheStats {
            entries: entries.len(),
            total_bytes: entries.iter().map(|entry| entry.size).sum(),
        })
    }

    /// List entries whose name is a fingerprint.
    ///
    /// Staging files and anything else in the root are ignored, as are
    /// entries whose metadata can no longer be read.
    fn list(&self) -> Result<Vec<Entry>, CacheError> {
        let mut entries = Vec::new();
        for dir_entry in fs::read_dir(&self.root)? {
            let Ok(dir_entry) = dir_entry else {
                continue;
            };
            let is_key = dir_entry
                .file_name()
                .to_str()
                .and_then(Fingerprint::from_hex)
                .is_some();
            if !is_key {
                continue;
            }
            let Ok(meta) = dir_entry.metadata() else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }
            let accessed = meta
                .accessed()
                .or_else(|_| meta.modified())
                .unwrap_or(UNIX_EPOCH);
            entries.push(Entry {
                path: dir_entry.path(),
                size: meta.len(),
                accessed,
            });
        }
        Ok(entries)
    }
}

/// Delete entries from a listing, least recently accessed first, until the
/// total size is at most `ceiling`.
fn evict_entries(mut entries: Vec<Entry>, ceiling: u64) -> EvictionReport {
    entries.sort_by_key(|entry| entry.accessed);

    let mut report = EvictionReport {
        remaining_bytes: entries.iter().map(|entry| entry.size).sum(),
        ..EvictionReport::default()
    };

    for entry in &entries {
        if report.remaining_bytes <= ceiling {
            break;
        }
        match fs::remove_file(&entry.path) {
            Ok(()) => {
                tracing::debug!(path = %entry.path.display(), bytes = entry.size, "evicted");
                report.removed += 1;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %entry.path.display(), "entry vanished before eviction");
            }
            Err(e) => {
                tracing::warn!(path = %entry.path.display(), "failed to evict cache entry: {e}");
                continue;
            }
        }
        report.freed_bytes += entry.size;
        report.remaining_bytes -= entry.size;
    }

    if report.removed > 0 {
        tracing::info!(
            removed = report.removed,
            freed_bytes = report.freed_bytes,
            remaining_bytes = report.remaining_bytes,
            "cache pruned"
        );
    }
    report
}

/// Temporary file for an entry that has not been committed yet.
#[derive(Debug)]
pub struct StagedEntry<'a> {
    store: &'a CacheStore,
    file: NamedTempFile,
}

impl StagedEntry<'_> {
    /// Path of the temporary file; renderers write their output here.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Atomically place the staged file as the entry for `key`.
    ///
    /// Never overwrites: if another writer committed the same key first, the
    /// staged file is discarded and the existing entry's path is returned.
    pub fn commit(self, key: &Fingerprint) -> Result<PathBuf, CacheError> {
        self.store.persist(key, self.file)
    }
}
