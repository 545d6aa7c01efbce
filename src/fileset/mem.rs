//! In-memory file set.

use super::FileSet;
use rustc_hash::FxHashMap;
use std::io::{self, Read};
use std::sync::Arc;

/// File set backed by an in-memory map of name to bytes.
///
/// Suited to bundles compiled into the binary (`include_bytes!`) and to
/// tests. Names are used verbatim as keys.
#[derive(Debug, Clone, Default)]
pub struct MemFileSet {
    files: FxHashMap<String, Arc<[u8]>>,
}

impl MemFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a file, builder style.
    pub fn with_file(mut self, name: impl Into<String>, content: impl AsRef<[u8]>) -> Self {
        self.insert(name, content);
        self
    }

    /// Add (or replace) a file.
    pub fn insert(&mut self, name: impl Into<String>, content: impl AsRef<[u8]>) {
        self.files.insert(name.into(), Arc::from(content.as_ref()));
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FileSet for MemFileSet {
    fn open(&self, name: &str) -> io::Result<Box<dyn Read + Send + '_>> {
        match self.files.get(name) {
            Some(content) => Ok(Box::new(&content[..])),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("open {name}: file does not exist"),
            )),
        }
    }

    fn list(&self) -> io::Result<Vec<String>> {
        let mut names: Vec<_> = self.files.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
