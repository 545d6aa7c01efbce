//! Transport-independent request view.

use percent_encoding::percent_decode_str;
use tiny_http::Method;

/// The parts of an HTTP request the handlers look at.
#[derive(Debug, Clone)]
pub struct ServeRequest {
    pub method: Method,
    /// Percent-decoded path, with its leading `/`.
    pub path: String,
    /// Escaped path as received, only when it differs from `path`.
    pub raw_path: Option<String>,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
}

impl ServeRequest {
    /// Build from a request target such as `/a%20b.js?v=1`.
    pub fn new(method: Method, url: &str) -> Self {
        let (raw, query) = match url.split_once('?') {
            Some((raw, query)) => (raw, Some(query.to_string())),
            None => (url, None),
        };

        let path = percent_decode_str(raw).decode_utf8_lossy().into_owned();
        let raw_path = (path != raw).then(|| raw.to_string());

        Self {
            method,
            path,
            raw_path,
            query,
            headers: Vec::new(),
        }
    }

    pub fn get(url: &str) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Snapshot a `tiny_http` request.
    pub fn from_http(request: &tiny_http::Request) -> Self {
        let mut req = Self::new(request.method().clone(), request.url());
        req.headers = request
            .headers()
            .iter()
            .map(|h| (h.field.as_str().as_str().to_string(), h.value.to_string()))
            .collect();
        req
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path_has_no_raw_path() {
        let req = ServeRequest::get("/assets/main.9f7c608eae51.js");
        assert_eq!(req.path, "/assets/main.9f7c608eae51.js");
        assert_eq!(req.raw_path, None);
        assert_eq!(req.query, None);
    }

    #[test]
    fn test_escaped_path_keeps_raw() {
        let req = ServeRequest::get("/my%20file.abc.js?v=2");
        assert_eq!(req.path, "/my file.abc.js");
        assert_eq!(req.raw_path.as_deref(), Some("/my%20file.abc.js"));
        assert_eq!(req.query.as_deref(), Some("v=2"));
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let req = ServeRequest::get("/").with_header("Range", "bytes=0-1");
        assert_eq!(req.header("range"), Some("bytes=0-1"));
        assert_eq!(req.header("etag"), None);
    }
}
