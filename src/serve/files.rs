//! Static file responses.
//!
//! Serves files from a [`HashFs`] by their original name: content type
//! from the extension, `ETag` from the content digest, single byte ranges,
//! and a configurable `Cache-Control` for the immutable hashed URLs.

use super::{Handler, Reply, ServeRequest};
use crate::hash::{HashFs, codec};
use crate::utils::mime;
use crate::log;
use std::io::{self, Read};
use std::path::Path;
use tiny_http::Method;

/// `Cache-Control` for content-addressed URLs.
pub const IMMUTABLE: &str = "public, max-age=31536000, immutable";

/// Response options for [`StaticFiles`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticOptions {
    /// `Cache-Control` value for successful responses (`None` to omit).
    pub cache_control: Option<String>,
}

impl Default for StaticOptions {
    fn default() -> Self {
        Self {
            cache_control: Some(IMMUTABLE.to_string()),
        }
    }
}

/// Serves files of a [`HashFs`] by original (unhashed) path.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    fs: HashFs,
    options: StaticOptions,
}

impl StaticFiles {
    pub fn new(fs: HashFs, options: StaticOptions) -> Self {
        Self { fs, options }
    }

    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        let mut body = Vec::new();
        self.fs.files().open(name)?.read_to_end(&mut body)?;
        Ok(body)
    }

    /// Strong ETag from the memoized content digest.
    fn etag(&self, name: &str) -> Option<String> {
        let hashed = self.fs.try_path(name).ok()?;
        Some(format!("\"{}\"", codec::split_hashed(&hashed).digest))
    }
}

impl Handler for StaticFiles {
    fn respond(&self, request: &ServeRequest) -> Reply {
        if !matches!(request.method, Method::Get | Method::Head) {
            return Reply::text(405, "405 Method Not Allowed").with_header("Allow", "GET, HEAD");
        }

        let name = request.path.trim_start_matches('/');
        let body = match self.read(name) {
            Ok(body) => body,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Reply::text(404, "404 Not Found");
            }
            Err(e) => {
                log!("serve"; "failed to read {}: {}", name, e);
                return Reply::text(500, "500 Internal Server Error");
            }
        };

        let mut reply = Reply::new(200)
            .with_header("Content-Type", mime::from_path(Path::new(name)))
            .with_header("Accept-Ranges", "bytes");
        if let Some(cache_control) = &self.options.cache_control {
            reply = reply.with_header("Cache-Control", cache_control.clone());
        }

        let etag = self.etag(name);
        if let Some(etag) = &etag {
            reply = reply.with_header("ETag", etag.clone());
        }

        if let (Some(etag), Some(candidates)) = (&etag, request.header("If-None-Match"))
            && etag_matches(etag, candidates)
        {
            return reply.with_status(304);
        }

        // HEAD keeps the body so the transport can report its length; tiny_http
        // never writes it for HEAD.
        match request.header("Range").map(|r| parse_range(r, body.len())) {
            Some(ByteRange::Partial(start, end)) => {
                let content_range = format!("bytes {}-{}/{}", start, end, body.len());
                reply
                    .with_status(206)
                    .with_header("Content-Range", content_range)
                    .with_body(body[start..=end].to_vec())
            }
            Some(ByteRange::Unsatisfiable) => Reply::text(416, "416 Range Not Satisfiable")
                .with_header("Content-Range", format!("bytes */{}", body.len())),
            Some(ByteRange::Full) | None => reply.with_body(body),
        }
    }
}

/// Outcome of interpreting a `Range` header against a body length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteRange {
    /// Header unsupported or malformed; serve the whole body.
    Full,
    /// Inclusive byte bounds.
    Partial(usize, usize),
    Unsatisfiable,
}

/// Parse a single `bytes=start-end` range.
fn parse_range(range: &str, len: usize) -> ByteRange {
    let Some(ranges) = range.trim().strip_prefix("bytes=") else {
        return ByteRange::Full;
    };
    // Multipart ranges are not supported
    if ranges.contains(',') {
        return ByteRange::Full;
    }
    let Some((start, end)) = ranges.split_once('-') else {
        return ByteRange::Full;
    };
    let (start, end) = (start.trim(), end.trim());

    match (start.parse::<usize>(), end.parse::<usize>()) {
        // "0-499"
        (Ok(start), Ok(end)) if start <= end => {
            if start >= len {
                ByteRange::Unsatisfiable
            } else {
                ByteRange::Partial(start, end.min(len - 1))
            }
        }
        // "500-"
        (Ok(start), Err(_)) if end.is_empty() => {
            if start >= len {
                ByteRange::Unsatisfiable
            } else {
                ByteRange::Partial(start, len - 1)
            }
        }
        // "-500": last 500 bytes
        (Err(_), Ok(suffix)) if start.is_empty() => {
            if suffix == 0 || len == 0 {
                ByteRange::Unsatisfiable
            } else {
                ByteRange::Partial(len.saturating_sub(suffix), len - 1)
            }
        }
        _ => ByteRange::Full,
    }
}

/// Check an `If-None-Match` list against our (strong) ETag.
fn etag_matches(etag: &str, candidates: &str) -> bool {
    candidates.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
    })
}
