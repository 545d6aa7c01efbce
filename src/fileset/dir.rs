//! Directory-backed file set.

use super::FileSet;
use jwalk::WalkDir;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Component, Path, PathBuf};

/// File set rooted at a directory on disk.
///
/// Names are `/`-separated paths relative to the root. Names that would
/// leave the root (absolute paths, `..`, symlinks pointing outside) are
/// reported as not found.
#[derive(Debug, Clone)]
pub struct DirFileSet {
    root: PathBuf,
}

impl DirFileSet {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a relative name to a canonical path under the root.
    fn resolve(&self, name: &str) -> io::Result<PathBuf> {
        let rel = Path::new(name);
        let plain = !name.is_empty()
            && rel
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !plain {
            return Err(not_found(name));
        }

        let canonical = self.root.join(rel).canonicalize()?;
        let root_canonical = self.root.canonicalize()?;
        if !canonical.starts_with(&root_canonical) {
            return Err(not_found(name));
        }
        Ok(canonical)
    }
}

impl FileSet for DirFileSet {
    fn open(&self, name: &str) -> io::Result<Box<dyn Read + Send + '_>> {
        let path = self.resolve(name)?;
        let file = File::open(path)?;
        Ok(Box::new(BufReader::with_capacity(64 * 1024, file)))
    }

    fn list(&self) -> io::Result<Vec<String>> {
        if !self.root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a directory", self.root.display()),
            ));
        }

        // An unreadable subdirectory fails the listing instead of shrinking it
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root) {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if let Ok(rel) = path.strip_prefix(&self.root) {
                names.push(to_slash(rel));
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Join path components with `/` regardless of platform.
fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn not_found(name: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("open {name}: file does not exist"),
    )
}
