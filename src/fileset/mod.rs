//! Byte-addressable file collections.
//!
//! A [`FileSet`] is anything that can open a file by its `/`-separated
//! relative name and list the names it holds. Two implementations ship
//! with the crate:
//!
//! - [`DirFileSet`] - a directory tree on disk
//! - [`MemFileSet`] - an in-memory bundle (embedded assets, tests)
//!
//! Consumers never hold a `FileSet` directly; they hold a [`FileSetHandle`],
//! which pairs the set with a process-unique [`FileSetId`]. The id is what
//! separates cache namespaces: two handles over identical content still
//! hash independently, while clones of one handle share everything.

mod dir;
mod mem;

pub use dir::DirFileSet;
pub use mem::MemFileSet;

use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Read capability over a collection of named files.
pub trait FileSet: Send + Sync {
    /// Open `name` for reading.
    fn open(&self, name: &str) -> io::Result<Box<dyn Read + Send + '_>>;

    /// All file names in the set, sorted.
    fn list(&self) -> io::Result<Vec<String>>;
}

/// Process-unique identity of a [`FileSetHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileSetId(u64);

impl FileSetId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for FileSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fs#{}", self.0)
    }
}

/// Shared handle to a file set with a stable identity.
#[derive(Clone)]
pub struct FileSetHandle {
    id: FileSetId,
    files: Arc<dyn FileSet>,
}

impl FileSetHandle {
    /// Wrap a file set, allocating a fresh identity for it.
    pub fn new(files: impl FileSet + 'static) -> Self {
        Self {
            id: FileSetId::next(),
            files: Arc::new(files),
        }
    }

    #[inline]
    pub fn id(&self) -> FileSetId {
        self.id
    }

    #[inline]
    pub fn open(&self, name: &str) -> io::Result<Box<dyn Read + Send + '_>> {
        self.files.open(name)
    }

    #[inline]
    pub fn list(&self) -> io::Result<Vec<String>> {
        self.files.list()
    }
}

impl fmt::Debug for FileSetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSetHandle").field("id", &self.id).finish()
    }
}

impl PartialEq for FileSetHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FileSetHandle {}
