//! Memoized content hashes.
//!
//! Maps `(file set, filename)` to the hashed path of that file. Entries are
//! computed on first access and kept for the life of the cache: the backing
//! content is assumed immutable, so an entry never goes stale. To pick up
//! changed content, hash through a fresh [`FileSetHandle`] (new namespace)
//! or a fresh cache.
//!
//! Concurrent first access to the same key is not coalesced. Every racer
//! reads and digests the file and the last insert wins; since the digest is
//! a pure function of content they all insert the same value.

use super::{HashError, codec};
use crate::debug;
use crate::fileset::{FileSetHandle, FileSetId};
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::io::{self, Read};
use std::sync::Arc;

/// Cache key: file set identity plus the exact filename string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub set: FileSetId,
    pub filename: String,
}

impl CacheKey {
    pub fn new(files: &FileSetHandle, filename: &str) -> Self {
        Self {
            set: files.id(),
            filename: filename.to_string(),
        }
    }
}

/// Concurrent `CacheKey -> hashed path` store.
#[derive(Debug, Default)]
pub struct HashCache {
    entries: DashMap<CacheKey, Arc<str>>,
}

impl HashCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hashed path of `filename` in `files`, computing it on first request.
    pub fn resolve(&self, files: &FileSetHandle, filename: &str) -> Result<String, HashError> {
        let key = CacheKey::new(files, filename);
        if let Some(hashed) = self.entries.get(&key) {
            return Ok(hashed.to_string());
        }

        let digest = digest_file(files, filename)?;
        let hashed = codec::hashed_name(filename, &digest);
        debug!("hash"; "{} {} -> {}", files.id(), filename, hashed);

        self.entries.insert(key, Arc::from(hashed.as_str()));
        Ok(hashed)
    }

    /// Whether `filename` has already been resolved for `files`.
    pub fn contains(&self, files: &FileSetHandle, filename: &str) -> bool {
        self.entries.contains_key(&CacheKey::new(files, filename))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// SHA-256 of the whole file, streamed.
fn digest_file(files: &FileSetHandle, filename: &str) -> Result<[u8; 32], HashError> {
    let reader = files.open(filename).map_err(|source| HashError::Open {
        path: filename.to_string(),
        source,
    })?;

    digest_reader(reader).map_err(|source| HashError::Read {
        path: filename.to_string(),
        source,
    })
}

/// SHA-256 of everything `reader` yields.
pub fn digest_reader(mut reader: impl Read) -> io::Result<[u8; 32]> {
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024];

    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buffer[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fileset::{FileSet, MemFileSet};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// File set that counts opens and can fail mid-read.
    struct Probe {
        inner: MemFileSet,
        opens: AtomicUsize,
    }

    impl Probe {
        fn new(inner: MemFileSet) -> Self {
            Self {
                inner,
                opens: AtomicUsize::new(0),
            }
        }
    }

    impl FileSet for Arc<Probe> {
        fn open(&self, name: &str) -> io::Result<Box<dyn Read + Send + '_>> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            if name == "broken" {
                return Ok(Box::new(Broken));
            }
            self.inner.open(name)
        }

        fn list(&self) -> io::Result<Vec<String>> {
            self.inner.list()
        }
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn test_digest_reader_matches_known_values() {
        assert_eq!(
            hex::encode(digest_reader(&b""[..]).unwrap()),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_resolve_memoizes() {
        let probe = Arc::new(Probe::new(MemFileSet::new().with_file("app.js", "x")));
        let files = FileSetHandle::new(Arc::clone(&probe));
        let cache = HashCache::new();

        let first = cache.resolve(&files, "app.js").unwrap();
        let second = cache.resolve(&files, "app.js").unwrap();
        assert_eq!(first, second);
        assert_eq!(probe.opens.load(Ordering::SeqCst), 1);
        assert!(cache.contains(&files, "app.js"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let probe = Arc::new(Probe::new(MemFileSet::new()));
        let files = FileSetHandle::new(Arc::clone(&probe));
        let cache = HashCache::new();

        assert!(matches!(
            cache.resolve(&files, "missing.js"),
            Err(HashError::Open { .. })
        ));
        assert!(matches!(
            cache.resolve(&files, "missing.js"),
            Err(HashError::Open { .. })
        ));
        assert_eq!(probe.opens.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_read_failure() {
        let probe = Arc::new(Probe::new(MemFileSet::new()));
        let files = FileSetHandle::new(probe);
        let cache = HashCache::new();

        let err = cache.resolve(&files, "broken").unwrap_err();
        assert!(matches!(err, HashError::Read { .. }));
        assert!(err.detail().contains("disk on fire"));
    }

    #[test]
    fn test_namespaces_are_per_handle() {
        let a = FileSetHandle::new(MemFileSet::new().with_file("app.js", "a"));
        let b = FileSetHandle::new(MemFileSet::new().with_file("app.js", "b"));
        let cache = HashCache::new();

        assert_ne!(
            cache.resolve(&a, "app.js").unwrap(),
            cache.resolve(&b, "app.js").unwrap()
        );
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_filenames_are_not_normalized() {
        let files = FileSetHandle::new(MemFileSet::new().with_file("app.js", "a"));
        let cache = HashCache::new();

        cache.resolve(&files, "app.js").unwrap();
        assert!(cache.resolve(&files, "./app.js").is_err());
        assert!(!cache.contains(&files, "./app.js"));
    }

    #[test]
    fn test_concurrent_resolve_agrees() {
        let files = FileSetHandle::new(
            MemFileSet::new().with_file("assets/main.js", "console.log(\"hello from main.js\");\n"),
        );
        let cache = HashCache::new();

        let results: Vec<String> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| cache.resolve(&files, "assets/main.js").unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(results.iter().all(|r| r == "assets/main.9f7c608eae51.js"));
        assert_eq!(cache.len(), 1);
    }
}
