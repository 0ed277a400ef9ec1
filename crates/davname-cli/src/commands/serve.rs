//! Serve command - serve a directory over WebDAV with the computed
//! `DAV:displayname` property.
//!
//! # Examples
//!
//! ```bash
//! # Serve ~/share on an auto-assigned localhost port
//! davname serve ~/share --displayname on
//!
//! # Use a config file, overriding its port
//! davname serve ~/share --config davname.toml --port 8080
//! ```

use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, ValueEnum};
use tokio::runtime::Runtime;
use tracing::{info, instrument};

use davname_core::ScopedConfig;
use davname_webdav::{DisplayNameFs, ServerConfig, WebDavServer};

use crate::config::{FileConfig, override_displayname};

/// Value of the `DavDisplayname` flag on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl From<Toggle> for bool {
    fn from(toggle: Toggle) -> Self {
        toggle == Toggle::On
    }
}

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Directory to serve
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// TOML config file with server and location directives
    #[arg(short, long, value_name = "FILE", env = "DAVNAME_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port to listen on (0 picks a free port)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind to
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<IpAddr>,

    /// Server-scope DavDisplayname setting, overriding the config file
    #[arg(long, value_enum)]
    pub displayname: Option<Toggle>,
}

/// Work out the scopes and listen address from the config file and flags.
fn resolve(args: &Args) -> Result<(ScopedConfig, ServerConfig)> {
    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };

    let mut scopes = file.to_scopes()?;
    if let Some(toggle) = args.displayname {
        override_displayname(&mut scopes, toggle.into());
    }

    let mut server = ServerConfig::default();
    if let Some(bind) = args.bind.or(file.server.bind) {
        server.bind_address = bind;
    }
    if let Some(port) = args.port.or(file.server.port) {
        server.port = port;
    }
    Ok((scopes, server))
}

#[instrument(level = "info", name = "cmd::serve", skip_all, fields(root = %args.root.display()))]
pub fn execute(args: &Args) -> Result<()> {
    let (scopes, server_config) = resolve(args)?;
    let fs = DisplayNameFs::local(&args.root, scopes)
        .with_context(|| format!("Cannot serve {}", args.root.display()))?;

    let runtime = Runtime::new().context("Failed to create tokio runtime")?;
    runtime.block_on(async {
        let server = WebDavServer::start(fs, server_config)
            .await
            .context("Failed to start WebDAV server")?;

        eprintln!("Serving {} at {}", args.root.display(), server.url());
        eprintln!("Press Ctrl-C to stop");

        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl-C")?;
        info!("Interrupt received, shutting down");
        server.stop().await;
        Ok::<(), anyhow::Error>(())
    })
}
