//! HTTP serving of hashed assets.
//!
//! # Module Structure
//!
//! - `request` / `reply` - transport-independent request and response
//! - `files` - [`StaticFiles`], serves files by original name
//! - `rewrite` - [`HashedFileServer`], hashed path -> original name
//! - `http` - `tiny_http` server loop
//!
//! Handlers compose: the rewriter wraps any [`Handler`] and only forwards
//! requests whose hashed path verifies.

mod files;
mod http;
mod reply;
mod request;
mod rewrite;

pub use files::{IMMUTABLE, StaticFiles, StaticOptions};
pub use http::{HttpServer, ShutdownHandle};
pub use reply::Reply;
pub use request::ServeRequest;
pub use rewrite::HashedFileServer;

use crate::hash::HashFs;

/// Something that turns a request into a reply.
pub trait Handler: Send + Sync {
    fn respond(&self, request: &ServeRequest) -> Reply;
}

/// Handler serving `fs` by hashed path.
pub fn build_handler(fs: HashFs, options: StaticOptions) -> HashedFileServer<StaticFiles> {
    let files = StaticFiles::new(fs.clone(), options);
    HashedFileServer::new(fs, files)
}
