//! Content-hashed asset paths.
//!
//! # Module Structure
//!
//! - `cache` - memoized `(file set, filename) -> hashed path` store
//! - `codec` - hashed path encoding, decoding and verification
//! - `error` - `HashError`
//!
//! # Usage
//!
//! ```ignore
//! let assets = HashFs::new(FileSetHandle::new(DirFileSet::new("public")));
//!
//! // In templates
//! let href = assets.path("css/site.css"); // "css/site.3f2a9c01b7de.css"
//!
//! // In request handling
//! let original = assets.unhashed("css/site.3f2a9c01b7de.css")?;
//! ```

mod cache;
pub mod codec;
mod error;

pub use cache::{CacheKey, HashCache, digest_reader};
pub use error::HashError;

use crate::fileset::FileSetHandle;
use crate::serve::{HashedFileServer, StaticFiles, StaticOptions};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A file set bound to the cache that hashes it.
///
/// Cloning is cheap and shares both the file set and the cache, so links
/// emitted through one clone are accepted by a server built from another.
#[derive(Debug, Clone)]
pub struct HashFs {
    files: FileSetHandle,
    cache: Arc<HashCache>,
}

impl HashFs {
    /// Bind `files` to a fresh cache.
    pub fn new(files: FileSetHandle) -> Self {
        Self::with_cache(files, Arc::new(HashCache::new()))
    }

    /// Bind `files` to an existing (possibly shared) cache.
    pub fn with_cache(files: FileSetHandle, cache: Arc<HashCache>) -> Self {
        Self { files, cache }
    }

    pub fn files(&self) -> &FileSetHandle {
        &self.files
    }

    pub fn cache(&self) -> &Arc<HashCache> {
        &self.cache
    }

    /// Hashed path of `filename`. Panics if the file cannot be hashed.
    pub fn path(&self, filename: &str) -> String {
        codec::encode_or_abort(&self.cache, &self.files, filename)
    }

    /// Hashed path of `filename`.
    pub fn try_path(&self, filename: &str) -> Result<String, HashError> {
        codec::encode(&self.cache, &self.files, filename)
    }

    /// Original filename of a hashed path whose digest is current.
    pub fn unhashed(&self, hashed: &str) -> Result<String, HashError> {
        codec::decode(&self.cache, &self.files, hashed)
    }

    /// Request handler serving this file set by hashed path.
    pub fn file_server(&self, options: StaticOptions) -> HashedFileServer<StaticFiles> {
        crate::serve::build_handler(self.clone(), options)
    }

    /// Hashed path of every file in the set, keyed by original name.
    pub fn manifest(&self) -> anyhow::Result<BTreeMap<String, String>> {
        let names = self.files.list()?;
        let manifest = names
            .into_par_iter()
            .map(|name| self.try_path(&name).map(|hashed| (name, hashed)))
            .collect::<Result<BTreeMap<_, _>, HashError>>()?;
        Ok(manifest)
    }
}
