//! Cache key computation.
//!
//! Provides [`Fingerprint`] for computing the content-based hash used to name
//! cache entries.

use std::fmt;

use sha2::{Digest, Sha256};

/// Version marker of the assembled-text format and renderer invocation.
///
/// Bump whenever segmentation, assembly or the renderer command line changes
/// in a way that affects output. All existing entries then stop matching.
pub const FORMAT_VERSION: &str = "srcdoc-cache-v1";

/// Length of a fingerprint in its hex encoding.
pub const KEY_LEN: usize = 64;

/// Everything that affects the rendered output of one invocation.
#[derive(Debug, Clone, Copy)]
pub struct FingerprintInputs<'a> {
    /// Raw input bytes.
    pub source: &'a [u8],
    /// Attribute assignments (`name=value`) in the order supplied.
    pub attributes: &'a [String],
    /// Pass-through renderer options in the order supplied.
    pub options: &'a [String],
    /// Renderer backend identifier (e.g. "html").
    pub backend: &'a str,
    /// Whether code lines are numbered.
    pub numbered: bool,
    /// Start delimiter.
    pub start: &'a str,
    /// End delimiter.
    pub end: &'a str,
}

/// SHA-256 digest identifying one cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Compute the fingerprint of `inputs`.
    ///
    /// # Hash Format
    ///
    /// SHA-256 over, in order: source, attributes, options, backend, numbering
    /// flag (`"numbered"` or `"plain"`), start delimiter, end delimiter and
    /// [`FORMAT_VERSION`]. Every field is prefixed with its length as a
    /// little-endian `u64`; lists are additionally prefixed with their element
    /// count, so no two distinct inputs share an encoding. Attribute and option
    /// order is significant.
    #[must_use]
    pub fn compute(inputs: &FingerprintInputs<'_>) -> Self {
        let mut hasher = Sha256::new();
        update_field(&mut hasher, inputs.source);
        update_list(&mut hasher, inputs.attributes);
        update_list(&mut hasher, inputs.options);
        update_field(&mut hasher, inputs.backend.as_bytes());
        let numbering = if inputs.numbered { "numbered" } else { "plain" };
        update_field(&mut hasher, numbering.as_bytes());
        update_field(&mut hasher, inputs.start.as_bytes());
        update_field(&mut hasher, inputs.end.as_bytes());
        update_field(&mut hasher, FORMAT_VERSION.as_bytes());
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&hasher.finalize());
        Self(digest)
    }

    /// Parse a fingerprint from its hex encoding.
    ///
    /// Returns `None` unless `name` is exactly [`KEY_LEN`] lowercase hex digits.
    #[must_use]
    pub fn from_hex(name: &str) -> Option<Self> {
        if name.len() != KEY_LEN || name.bytes().any(|b| b.is_ascii_uppercase()) {
            return None;
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(name, &mut bytes).ok()?;
        Some(Self(bytes))
    }

    /// Lowercase hex encoding, used as the entry's file name.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn update_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

fn update_list(hasher: &mut Sha256, items: &[String]) {
    hasher.update((items.len() as u64).to_le_bytes());
    for item in items {
        update_field(hasher, item.as_bytes());
    }
}
