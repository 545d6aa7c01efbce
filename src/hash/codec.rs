//! Hashed path encoding and decoding.
//!
//! A hashed path injects a short content digest before the extension:
//!
//! ```text
//! assets/main.js   -> assets/main.9f7c608eae51.js
//! assets/empty     -> assets/empty.e3b0c44298fc
//! ```
//!
//! Decoding never trusts the digest it is given. It recovers the candidate
//! filename by string surgery, re-encodes it through the [`HashCache`] and
//! requires an exact match, so encode and decode share a single source of
//! truth.

use super::{HashCache, HashError};
use crate::fileset::FileSetHandle;

/// Number of digest bytes kept in a hashed path (12 hex chars).
pub const DIGEST_BYTES: usize = 6;

/// Split `path` into `(stem, ext)` at the last `.` of its final segment.
///
/// `ext` keeps its leading dot and is empty when the final segment has no
/// dot. Dots in directory names are never treated as extensions.
pub fn split_ext(path: &str) -> (&str, &str) {
    let seg_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[seg_start..].rfind('.') {
        Some(i) => path.split_at(seg_start + i),
        None => (path, ""),
    }
}

/// Compose the hashed form of `filename` from a full content digest.
pub fn hashed_name(filename: &str, digest: &[u8]) -> String {
    let (stem, ext) = split_ext(filename);
    let short = &digest[..DIGEST_BYTES.min(digest.len())];
    format!("{stem}.{}{ext}", hex::encode(short))
}

/// A hashed path taken apart, without any verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedParts<'a> {
    /// Candidate original filename.
    pub filename: String,
    /// Digest segment without its leading dot (may be empty or bogus).
    pub digest: &'a str,
}

/// Take a hashed path apart into candidate filename and digest segment.
///
/// When only one dot-segment exists, it is the digest of an extensionless
/// file (`name.e3b0c44298fc`), not an extension.
pub fn split_hashed(hashed: &str) -> HashedParts<'_> {
    let (rest, ext) = split_ext(hashed);
    let (base, digest_seg) = split_ext(rest);

    if digest_seg.is_empty() {
        HashedParts {
            filename: rest.to_string(),
            digest: ext.strip_prefix('.').unwrap_or(ext),
        }
    } else {
        HashedParts {
            filename: format!("{base}{ext}"),
            digest: &digest_seg[1..],
        }
    }
}

/// Hashed path of `filename`, or the resolution error.
pub fn encode(
    cache: &HashCache,
    files: &FileSetHandle,
    filename: &str,
) -> Result<String, HashError> {
    cache.resolve(files, filename)
}

/// Hashed path of `filename`, panicking if it cannot be resolved.
///
/// Converts a recoverable error into a panic. Use it where a missing asset
/// means a broken build (templates referencing bundled files), and
/// [`encode`] everywhere else.
pub fn encode_or_abort(cache: &HashCache, files: &FileSetHandle, filename: &str) -> String {
    match encode(cache, files, filename) {
        Ok(hashed) => hashed,
        Err(err) => panic!("{}", err.detail()),
    }
}

/// Recover the original filename from a hashed path, verifying the digest
/// against current content.
pub fn decode(
    cache: &HashCache,
    files: &FileSetHandle,
    hashed: &str,
) -> Result<String, HashError> {
    let HashedParts { filename, .. } = split_hashed(hashed);
    let expected = cache.resolve(files, &filename)?;
    if expected != hashed {
        return Err(HashError::PathMismatch(hashed.to_string()));
    }
    Ok(filename)
}
