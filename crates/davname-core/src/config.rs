//! Per-scope configuration and the `DavDisplayname` directive.
//!
//! Each configuration scope (the server itself, or a `<Location>`-style URL
//! prefix) carries a [`DirConfig`]. A scope that never mentions the directive
//! leaves the setting unset, and merging lets the most specific explicit
//! setting win.

use crate::error::{ConfigError, ConfigResult};
use std::fmt;
use tracing::{debug, trace};

/// Display-name settings for one configuration scope.
///
/// `None` means "not set in this scope"; it behaves as disabled until merged
/// with an ancestor that set it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirConfig {
    displayname: Option<bool>,
}

impl DirConfig {
    /// A scope with nothing set.
    pub const fn new() -> Self {
        Self { displayname: None }
    }

    /// A scope that explicitly sets the display name on or off.
    pub const fn with_displayname(enabled: bool) -> Self {
        Self {
            displayname: Some(enabled),
        }
    }

    /// Whether the display name is rendered for this scope.
    pub fn enabled(&self) -> bool {
        self.displayname.unwrap_or(false)
    }

    /// Whether this scope, or one merged into it, set the directive.
    pub fn is_explicit(&self) -> bool {
        self.displayname.is_some()
    }

    pub fn displayname(&self) -> Option<bool> {
        self.displayname
    }

    pub fn set_displayname(&mut self, enabled: bool) {
        self.displayname = Some(enabled);
    }

    /// Merge a child scope (`add`) over its parent (`base`).
    pub fn merge(base: DirConfig, add: DirConfig) -> DirConfig {
        DirConfig {
            displayname: add.displayname.or(base.displayname),
        }
    }
}

/// Where a directive appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Server-wide defaults.
    Server,
    /// A URL-prefix section.
    Location,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Server => f.write_str("server"),
            Scope::Location => f.write_str("location"),
        }
    }
}

/// A configuration directive this crate understands.
#[derive(Debug, Clone, Copy)]
pub struct DirectiveSpec {
    pub name: &'static str,
    pub help: &'static str,
    pub allowed: &'static [Scope],
    set: fn(&mut DirConfig, bool),
}

pub const DAV_DISPLAYNAME: &str = "DavDisplayname";

/// All recognised directives.
pub static DIRECTIVES: &[DirectiveSpec] = &[DirectiveSpec {
    name: DAV_DISPLAYNAME,
    help: "When enabled, the DAV:displayname property will be set to the name of the resource or collection.",
    allowed: &[Scope::Server, Scope::Location],
    set: DirConfig::set_displayname,
}];

/// Look up a directive by name. Names are case-insensitive.
pub fn lookup_directive(name: &str) -> Option<&'static DirectiveSpec> {
    DIRECTIVES.iter().find(|d| d.name.eq_ignore_ascii_case(name))
}

/// Parse an `On`/`Off` flag argument (case-insensitive, optionally quoted).
pub fn parse_flag(directive: &'static str, value: &str) -> ConfigResult<bool> {
    let unquoted = value.trim_matches('"');
    if unquoted.eq_ignore_ascii_case("on") {
        Ok(true)
    } else if unquoted.eq_ignore_ascii_case("off") {
        Ok(false)
    } else {
        Err(ConfigError::InvalidFlag {
            directive,
            value: value.to_string(),
        })
    }
}

/// Apply one directive line, e.g. `DavDisplayname on`, to a scope.
///
/// Blank lines and `#` comments are accepted and do nothing.
pub fn apply_directive(conf: &mut DirConfig, line: &str, scope: Scope) -> ConfigResult<()> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(());
    }

    let mut tokens = line.split_whitespace();
    let Some(name) = tokens.next() else {
        return Ok(());
    };
    let spec = lookup_directive(name)
        .ok_or_else(|| ConfigError::UnknownDirective(name.to_string()))?;

    if !spec.allowed.contains(&scope) {
        return Err(ConfigError::DirectiveNotAllowed {
            directive: spec.name,
            scope,
        });
    }

    let args: Vec<&str> = tokens.collect();
    let value = match args.as_slice() {
        [] => {
            return Err(ConfigError::MissingArgument {
                directive: spec.name,
            });
        }
        [value] => *value,
        _ => {
            return Err(ConfigError::TooManyArguments {
                directive: spec.name,
                count: args.len(),
            });
        }
    };

    let flag = parse_flag(spec.name, value)?;
    (spec.set)(conf, flag);
    trace!(directive = spec.name, flag, %scope, "applied directive");
    Ok(())
}

/// Apply a sequence of directive lines to a fresh scope.
pub fn apply_directives<I, S>(lines: I, scope: Scope) -> ConfigResult<DirConfig>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut conf = DirConfig::new();
    for line in lines {
        apply_directive(&mut conf, line.as_ref(), scope)?;
    }
    Ok(conf)
}

/// A URL-prefix scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    path: String,
    config: DirConfig,
}

impl Location {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn config(&self) -> &DirConfig {
        &self.config
    }

    /// Whether `url` falls inside this location.
    ///
    /// Matching is segment-aware: `/private` matches `/private`, `/private/`
    /// and `/private/x`, but not `/privatefoo`.
    pub fn matches(&self, url: &str) -> bool {
        let prefix = self.path.trim_end_matches('/');
        if prefix.is_empty() {
            return true;
        }
        url.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }

    fn depth(&self) -> usize {
        self.path.split('/').filter(|s| !s.is_empty()).count()
    }
}

/// Server scope plus location scopes, resolved per request URL.
///
/// Built once while loading configuration and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopedConfig {
    server: DirConfig,
    locations: Vec<Location>,
}

impl ScopedConfig {
    pub fn new(server: DirConfig) -> Self {
        Self {
            server,
            locations: Vec::new(),
        }
    }

    pub fn server(&self) -> &DirConfig {
        &self.server
    }

    pub fn set_server(&mut self, server: DirConfig) {
        self.server = server;
    }

    /// Locations ordered from least to most specific.
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Add a location scope.
    ///
    /// Paths are compared as written (percent-encoded, like request URLs).
    /// Locations of equal depth keep the order they were added in.
    pub fn add_location(&mut self, path: &str, config: DirConfig) -> ConfigResult<()> {
        if !path.starts_with('/') {
            return Err(ConfigError::InvalidLocation(path.to_string()));
        }
        debug!(path = %path, displayname = ?config.displayname(), "adding location scope");
        self.locations.push(Location {
            path: path.to_string(),
            config,
        });
        self.locations.sort_by_key(Location::depth);
        Ok(())
    }

    /// Effective configuration for a request URL.
    ///
    /// Starts from the server scope and merges each matching location over it,
    /// least specific first.
    pub fn resolve(&self, url: &str) -> DirConfig {
        self.locations
            .iter()
            .filter(|location| location.matches(url))
            .fold(self.server, |base, location| {
                DirConfig::merge(base, location.config)
            })
    }
}
