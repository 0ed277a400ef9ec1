//! WebDAV server exposing the computed `DAV:displayname` property.
//!
//! This crate hosts [`davname_core`]'s live-property registry inside a
//! [dav-server](https://docs.rs/dav-server) handler.
//!
//! # How It Works
//!
//! 1. [`DisplayNameFs`] wraps any `DavFileSystem` (a local directory by default)
//! 2. PROPFIND asks it for properties; live ones are rendered per request,
//!    using the `DavDisplayname` setting of the scope the URL falls in
//! 3. PROPPATCH on `DAV:displayname` is refused with 403, since the value is
//!    always computed
//!
//! # Example
//!
//! ```ignore
//! use davname_core::{DirConfig, ScopedConfig};
//! use davname_webdav::{DisplayNameFs, ServerConfig, WebDavServer};
//!
//! let mut scopes = ScopedConfig::default();
//! scopes.add_location("/", DirConfig::with_displayname(true))?;
//!
//! let fs = DisplayNameFs::local(Path::new("/srv/dav"), scopes)?;
//! let server = WebDavServer::start(fs, ServerConfig::default()).await?;
//! println!("Serving on {}", server.url());
//! ```
//!
//! # Security
//!
//! By default, the server binds to localhost (127.0.0.1) only.
//! No authentication is performed.

mod error;
mod filesystem;
mod server;

// Public exports
pub use error::{WebDavError, WebDavResult};
pub use filesystem::DisplayNameFs;
pub use server::{ServerConfig, WebDavServer};
