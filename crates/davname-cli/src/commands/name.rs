//! Name command - print the display name derived from URL paths.
//!
//! # Examples
//!
//! ```bash
//! davname name /reports/q3.pdf /photos/2023/
//! # q3
//! # 2023
//! ```

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use davname_core::derive_name;

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Request URL paths, still percent-encoded
    #[arg(value_name = "URL", required = true)]
    pub urls: Vec<String>,
}

#[instrument(level = "info", name = "cmd::name", skip_all, fields(count = args.urls.len()))]
pub fn execute(args: &Args) -> Result<()> {
    for url in &args.urls {
        println!("{}", derive_name(url));
    }
    Ok(())
}
