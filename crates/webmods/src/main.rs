//! webmods - configuration inspector
//!
//! Loads the layered configuration the same way a service would and prints
//! the merged result.
//!
//! | Command | Description |
//! |---------|-------------|
//! | `webmods --cmd api get log.level` | Print one value |
//! | `webmods --cmd api dump` | Print the merged tree as JSON |

use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use webmods::App;

/// Command line interface for webmods
#[derive(Parser, Debug)]
#[command(name = "webmods")]
#[command(about = "Inspect layered service configuration")]
#[command(version)]
pub struct Cli {
    /// Command whose configuration is loaded
    #[arg(long, default_value = "app")]
    pub cmd: String,

    /// Directory holding the configuration layers
    #[arg(long, default_value = "configs")]
    pub config_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the value at a dotted path
    Get {
        /// Dotted path, e.g. `log.level`
        path: String,
    },
    /// Print the merged configuration
    Dump,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let app = App::init_with_config_path(&cli.cmd, &cli.config_dir)
        .with_context(|| format!("loading configuration from {}", cli.config_dir.display()))?;

    match cli.command {
        Command::Get { path } => {
            let Some(value) = app.config().get(&path) else {
                bail!("{path} is not set");
            };
            match value {
                serde_json::Value::String(s) => println!("{s}"),
                other => println!("{}", serde_json::to_string_pretty(other)?),
            }
        }
        Command::Dump => {
            println!("{}", serde_json::to_string_pretty(app.config().all())?);
        }
    }
    Ok(())
}
