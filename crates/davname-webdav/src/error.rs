//! Errors raised while setting up the WebDAV server.
//!
//! Request handling itself never fails because of the display-name property;
//! a property that does not apply is reported to dav-server as
//! `FsError::NotFound`, which it turns into a 404 propstat.

use davname_core::ConfigError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// WebDAV server setup errors.
#[derive(Debug, Error)]
pub enum WebDavError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Served root is missing or not a directory.
    #[error("Not a directory: {}", .0.display())]
    InvalidRoot(PathBuf),

    /// Scope configuration could not be applied.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for WebDAV operations.
pub type WebDavResult<T> = Result<T, WebDavError>;
