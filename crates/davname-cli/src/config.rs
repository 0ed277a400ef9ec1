//! Configuration file support.
//!
//! A config file holds the server-scope directives and any number of
//! `[[location]]` scopes, each carrying its own directive lines:
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1"
//! port = 8080
//! directives = ["DavDisplayname off"]
//!
//! [[location]]
//! path = "/public"
//! directives = ["DavDisplayname on"]
//! ```

use std::fs;
use std::net::IpAddr;
use std::path::Path;

use anyhow::{Context, Result};
use davname_core::{ConfigResult, Scope, ScopedConfig, apply_directives};
use serde::Deserialize;
use tracing::debug;

/// Root configuration structure.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub server: ServerSection,
    #[serde(rename = "location")]
    pub locations: Vec<LocationSection>,
}

/// `[server]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub bind: Option<IpAddr>,
    pub port: Option<u16>,
    pub directives: Vec<String>,
}

/// One `[[location]]` entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocationSection {
    pub path: String,
    #[serde(default)]
    pub directives: Vec<String>,
}

impl FileConfig {
    /// Parse a config file from TOML text.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        debug!(
            path = %path.display(),
            locations = config.locations.len(),
            "Loaded config file"
        );
        Ok(config)
    }

    /// Apply every directive and build the scope tree.
    pub fn to_scopes(&self) -> ConfigResult<ScopedConfig> {
        let server = apply_directives(&self.server.directives, Scope::Server)?;
        let mut scopes = ScopedConfig::new(server);
        for location in &self.locations {
            let config = apply_directives(&location.directives, Scope::Location)?;
            scopes.add_location(&location.path, config)?;
        }
        Ok(scopes)
    }
}

/// Force the server-scope `DavDisplayname` value.
///
/// Location scopes that set the directive themselves still win for their
/// subtree.
pub fn override_displayname(scopes: &mut ScopedConfig, enabled: bool) {
    let mut server = *scopes.server();
    server.set_displayname(enabled);
    scopes.set_server(server);
}
