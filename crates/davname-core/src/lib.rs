//! Computed `DAV:displayname` live property for WebDAV servers.
//!
//! The display name of a resource is derived purely from its URL: the last
//! path segment, without the trailing slash of a collection and without the
//! rightmost extension, percent-decoded.
//!
//! # Pieces
//!
//! - [`derive_name`]: URL path to display name, total over all inputs.
//! - [`DisplayNameProvider`]: implements [`LivePropertyProvider`], the
//!   capability set a host uses to find, render and (not) patch a live
//!   property.
//! - [`LivePropRegistry`]: the host side, assigning namespace indices and
//!   dispatching to registered providers.
//! - [`DirConfig`] / [`ScopedConfig`]: the `DavDisplayname` on/off setting,
//!   per URL scope, with nested-scope override semantics.
//!
//! # Example
//!
//! ```
//! use davname_core::{DirConfig, LivePropRegistry, RenderMode};
//!
//! let registry = LivePropRegistry::with_displayname();
//! let found = registry.find("DAV:", "displayname").unwrap();
//! let outcome = registry.render(
//!     found,
//!     "/reports/q3.pdf",
//!     RenderMode::Value,
//!     &DirConfig::with_displayname(true),
//! );
//! assert_eq!(outcome.markup(), Some("<lp1:displayname>q3</lp1:displayname>"));
//! ```
//!
//! All types are immutable after setup and safe to share across threads.

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod liveprop;
pub mod name;
pub mod registry;

pub use config::{DirConfig, Location, Scope, ScopedConfig, apply_directive, apply_directives};
pub use error::{ConfigError, ConfigResult};
pub use liveprop::{
    DAV_NAMESPACE, DisplayNameProvider, LivePropGroup, LivePropSpec, LivePropertyProvider,
    PatchOperation, PatchOutcome, PatchRequest, PropId, RenderMode, RenderOutcome, RenderRequest,
};
pub use name::derive_name;
pub use registry::{FoundProp, LivePropRegistry, NamespaceTable};
