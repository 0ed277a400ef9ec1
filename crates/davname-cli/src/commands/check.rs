//! Check command - validate a config file and show the resolved scopes.
//!
//! # Examples
//!
//! ```bash
//! # Show server and location scopes
//! davname check davname.toml
//!
//! # Show the effective setting for specific URLs
//! davname check davname.toml --url /public/a.txt --url /private/
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use davname_core::config::DAV_DISPLAYNAME;
use davname_core::derive_name;

use crate::config::FileConfig;
use crate::output::{create_table, format_flag};

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Path to the TOML config file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Resolve the effective setting for this URL path (repeatable)
    #[arg(long = "url", value_name = "URL")]
    pub urls: Vec<String>,
}

#[instrument(level = "info", name = "cmd::check", skip_all, fields(config = %args.config.display()))]
pub fn execute(args: &Args) -> Result<()> {
    let file = FileConfig::load(&args.config)?;
    let scopes = file.to_scopes()?;

    let mut table = create_table();
    table.set_header(vec!["Scope", "Path", DAV_DISPLAYNAME]);
    table.add_row(vec![
        "server",
        "*",
        format_flag(scopes.server().displayname()),
    ]);
    for location in scopes.locations() {
        table.add_row(vec![
            "location",
            location.path(),
            format_flag(location.config().displayname()),
        ]);
    }
    println!("{table}");

    if !args.urls.is_empty() {
        let mut table = create_table();
        table.set_header(vec!["URL", DAV_DISPLAYNAME, "displayname"]);
        for url in &args.urls {
            let effective = scopes.resolve(url);
            let shown = if effective.enabled() {
                derive_name(url)
            } else {
                String::new()
            };
            table.add_row(vec![
                url.clone(),
                format_flag(Some(effective.enabled())).to_string(),
                shown,
            ]);
        }
        println!("{table}");
    }

    Ok(())
}
