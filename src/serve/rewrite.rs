//! Hashed path rewriting in front of a file handler.

use super::{Handler, Reply, ServeRequest};
use crate::debug;
use crate::hash::{HashError, HashFs, codec};
use percent_encoding::percent_decode_str;

/// Accepts only current hashed paths and forwards them, unhashed, to the
/// wrapped handler.
///
/// Any path that fails to decode (unknown file, stale or forged digest,
/// plain unhashed path) is answered with `400 Bad Request` and never
/// reaches the inner handler.
#[derive(Debug, Clone)]
pub struct HashedFileServer<H> {
    fs: HashFs,
    inner: H,
}

impl<H: Handler> HashedFileServer<H> {
    pub fn new(fs: HashFs, inner: H) -> Self {
        Self { fs, inner }
    }

    pub fn hash_fs(&self) -> &HashFs {
        &self.fs
    }

    /// Copy of `request` with its paths mapped back to original filenames.
    pub fn rewrite(&self, request: &ServeRequest) -> Result<ServeRequest, HashError> {
        let mut request = request.clone();

        let hashed = strip_slash(&request.path);
        let filename = self.fs.unhashed(hashed)?;

        if let Some(raw) = &request.raw_path {
            let raw_filename = unhash_raw(strip_slash(raw), hashed, &filename)?;
            request.raw_path = Some(format!("/{raw_filename}"));
        }
        request.path = format!("/{filename}");

        Ok(request)
    }
}

impl<H: Handler> Handler for HashedFileServer<H> {
    fn respond(&self, request: &ServeRequest) -> Reply {
        match self.rewrite(request) {
            Ok(rewritten) => self.inner.respond(&rewritten),
            Err(err) => {
                if err.is_not_found() {
                    debug!("serve"; "rejected {}: no asset `{}`", request.path, err.path());
                } else {
                    debug!("serve"; "rejected {}: {}", request.path, err.detail());
                }
                Reply::text(400, err.detail())
            }
        }
    }
}

fn strip_slash(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

/// Rewrite the escaped form of a hashed path.
///
/// The raw path must be an encoding of the same hashed path, and its own
/// candidate filename must decode to the verified `filename`.
fn unhash_raw(raw: &str, hashed: &str, filename: &str) -> Result<String, HashError> {
    let mismatch = || HashError::PathMismatch(raw.to_string());

    if percent_decode_str(raw).decode_utf8_lossy() != hashed {
        return Err(mismatch());
    }

    let candidate = codec::split_hashed(raw).filename;
    if percent_decode_str(&candidate).decode_utf8_lossy() != filename {
        return Err(mismatch());
    }
    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fileset::{FileSetHandle, MemFileSet};
    use std::sync::Mutex;

    /// Inner handler that records what it was asked for.
    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<ServeRequest>>,
    }

    impl Handler for Recorder {
        fn respond(&self, request: &ServeRequest) -> Reply {
            self.seen.lock().unwrap().push(request.clone());
            Reply::text(200, "ok")
        }
    }

    fn server() -> HashedFileServer<Recorder> {
        let fs = HashFs::new(FileSetHandle::new(
            MemFileSet::new()
                .with_file("assets/main.js", "console.log(\"hello from main.js\");\n")
                .with_file("assets/my file.js", ""),
        ));
        HashedFileServer::new(fs, Recorder::default())
    }

    #[test]
    fn test_forwards_unhashed_path() {
        let server = server();
        let request = ServeRequest::get("/assets/main.9f7c608eae51.js?v=1");
        let reply = server.respond(&request);

        assert_eq!(reply.status, 200);
        let seen = server.inner.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].path, "/assets/main.js");
        assert_eq!(seen[0].query.as_deref(), Some("v=1"));
        // caller's request is untouched
        assert_eq!(request.path, "/assets/main.9f7c608eae51.js");
    }

    #[test]
    fn test_rewrites_raw_path() {
        let server = server();
        let request = ServeRequest::get("/assets/my%20file.e3b0c44298fc.js");
        let rewritten = server.rewrite(&request).unwrap();

        assert_eq!(rewritten.path, "/assets/my file.js");
        assert_eq!(rewritten.raw_path.as_deref(), Some("/assets/my%20file.js"));
    }

    #[test]
    fn test_raw_path_must_match_path() {
        let server = server();
        let mut request = ServeRequest::get("/assets/my%20file.e3b0c44298fc.js");
        request.raw_path = Some("/assets/other%20file.e3b0c44298fc.js".into());

        let err = server.rewrite(&request).unwrap_err();
        assert!(matches!(err, HashError::PathMismatch(_)));
    }

    #[test]
    fn test_rejects_without_forwarding() {
        let server = server();

        let reply = server.respond(&ServeRequest::get("/assets/main.js"));
        assert_eq!(reply.status, 400);
        assert!(reply.body_text().contains("error opening file"));

        let reply = server.respond(&ServeRequest::get("/assets/main.000000000000.js"));
        assert_eq!(reply.status, 400);
        assert!(reply.body_text().contains("path mismatch"));

        assert!(server.inner.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_missing_asset_is_not_found() {
        let server = server();

        let err = server
            .rewrite(&ServeRequest::get("/assets/gone.e3b0c44298fc.js"))
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.path(), "assets/gone.js");

        let err = server
            .rewrite(&ServeRequest::get("/assets/main.000000000000.js"))
            .unwrap_err();
        assert!(!err.is_not_found());
        assert_eq!(err.path(), "assets/main.000000000000.js");
    }
}
