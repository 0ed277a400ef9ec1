//! Common test utilities for WebDAV integration tests.

pub mod harness;

pub use harness::{TestServer, displayname_prop, enabled_everywhere};
