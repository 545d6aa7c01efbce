//! Hashing and path decoding errors.

use std::io;
use thiserror::Error;

/// Errors from resolving or decoding hashed paths.
#[derive(Debug, Error)]
pub enum HashError {
    #[error("hashfs: error opening file `{path}`")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("hashfs: error reading file `{path}`")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("hashfs: path mismatch for `{0}`")]
    PathMismatch(String),
}

impl HashError {
    /// Message plus underlying cause, suitable for a response body.
    pub fn detail(&self) -> String {
        match self {
            Self::Open { source, .. } | Self::Read { source, .. } => format!("{self}: {source}"),
            Self::PathMismatch(_) => self.to_string(),
        }
    }

    /// The file or URL path the error is about.
    pub fn path(&self) -> &str {
        match self {
            Self::Open { path, .. } | Self::Read { path, .. } | Self::PathMismatch(path) => path,
        }
    }

    /// Whether the file was missing rather than unreadable.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Open { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_includes_cause() {
        let err = HashError::Open {
            path: "foo".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "file does not exist"),
        };
        assert_eq!(err.to_string(), "hashfs: error opening file `foo`");
        assert_eq!(
            err.detail(),
            "hashfs: error opening file `foo`: file does not exist"
        );
        assert!(err.is_not_found());
        assert_eq!(err.path(), "foo");
    }

    #[test]
    fn test_mismatch_message() {
        let err = HashError::PathMismatch("a.000000000000.js".into());
        assert_eq!(err.detail(), "hashfs: path mismatch for `a.000000000000.js`");
        assert!(!err.is_not_found());
    }
}
