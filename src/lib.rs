//! hashfs - content-hashed static asset paths.
//!
//! Every asset gets a URL with a short SHA-256 digest of its content
//! injected before the extension (`main.js` -> `main.9f7c608eae51.js`), so
//! clients can cache it forever while any content change yields a new URL.
//! The file server only accepts the current hashed path of each file and
//! rejects stale, forged or unhashed paths with `400 Bad Request`.
//!
//! ```ignore
//! use hashfs::{DirFileSet, FileSetHandle, HashFs, StaticOptions};
//!
//! let assets = HashFs::new(FileSetHandle::new(DirFileSet::new("public")));
//! let href = format!("/{}", assets.path("css/site.css"));
//! let handler = assets.file_server(StaticOptions::default());
//! ```

pub mod cli;
pub mod config;
pub mod fileset;
pub mod hash;
pub mod logger;
pub mod serve;
pub mod utils;

pub use fileset::{DirFileSet, FileSet, FileSetHandle, FileSetId, MemFileSet};
pub use hash::{HashCache, HashError, HashFs};
pub use serve::{
    Handler, HashedFileServer, HttpServer, Reply, ServeRequest, StaticFiles, StaticOptions,
    build_handler,
};
