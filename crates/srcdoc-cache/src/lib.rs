//! Content-addressed render cache for srcdoc.
//!
//! Rendering a document through the external renderer is expensive, so
//! rendered output is stored under a key derived from every input that can
//! affect it. Two pieces form the API:
//!
//! - [`Fingerprint`]: SHA-256 over source bytes and render configuration
//! - [`CacheStore`]: one flat file per fingerprint under a root directory,
//!   bounded in total size by least-recently-used eviction
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use srcdoc_cache::{CacheStore, Fingerprint, FingerprintInputs};
//!
//! let store = CacheStore::open(PathBuf::from("/tmp/srcdoc-cache"), 10 * 1024 * 1024)?;
//! let key = Fingerprint::compute(&FingerprintInputs {
//!     source: b"int x;\n",
//!     attributes: &[],
//!     options: &[],
//!     backend: "html",
//!     numbered: false,
//!     start: "/*",
//!     end: "*/",
//! });
//!
//! if store.lookup(&key).is_none() {
//!     store.insert(&key, &mut &b"<p>rendered</p>"[..])?;
//! }
//! store.prune();
//! # Ok::<(), srcdoc_cache::CacheError>(())
//! ```

mod fingerprint;
mod store;

use std::path::PathBuf;

pub use fingerprint::{FORMAT_VERSION, Fingerprint, FingerprintInputs, KEY_LEN};
pub use store::{CacheStats, CacheStore, EvictionReport, StagedEntry};

/// Cache error.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The cache root cannot be created or is not readable and writable.
    #[error("cache directory {} is unavailable: {source}", path.display())]
    Unavailable {
        /// Cache root that was checked.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// I/O error while reading or writing an entry.
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),
}
