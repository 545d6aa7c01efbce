//! Configuration section definitions.
//!
//! Each module corresponds to a section in `hashfs.toml`:
//!
//! | Module   | TOML Section | Purpose                         |
//! |----------|--------------|---------------------------------|
//! | `assets` | `[assets]`   | Asset root directory            |
//! | `serve`  | `[serve]`    | HTTP server                     |

mod assets;
mod serve;

pub use assets::AssetsConfig;
pub use serve::ServeConfig;
