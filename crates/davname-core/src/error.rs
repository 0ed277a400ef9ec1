//! Error types for configuration loading.
//!
//! Rendering has no error path: an unknown property or a disabled scope is
//! reported as [`RenderOutcome::NotApplicable`](crate::RenderOutcome).
//! Only directive parsing and scope setup can fail.

use crate::config::Scope;
use thiserror::Error;

/// Errors raised while parsing directives or building scopes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Directive name not recognised.
    #[error("Unknown directive: {0}")]
    UnknownDirective(String),

    /// Flag directive given without a value.
    #[error("{directive} takes one argument, On or Off")]
    MissingArgument { directive: &'static str },

    /// Flag directive given more than one value.
    #[error("{directive} takes one argument, got {count}")]
    TooManyArguments {
        directive: &'static str,
        count: usize,
    },

    /// Flag value other than On/Off.
    #[error("{directive} must be On or Off, got {value:?}")]
    InvalidFlag {
        directive: &'static str,
        value: String,
    },

    /// Location path that is not absolute.
    #[error("Invalid location {0:?}: paths must start with '/'")]
    InvalidLocation(String),

    /// Directive used in a scope it does not support.
    #[error("{directive} is not allowed in {scope} scope")]
    DirectiveNotAllowed {
        directive: &'static str,
        scope: Scope,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
