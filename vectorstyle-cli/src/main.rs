//! vectorstyle CLI
//!
//! Renders vector tiles with a map style and inspects styles and sprites.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use vectorstyle::logging::init_logging;

use crate::commands::{common, inspect, render, sprites};
use crate::error::CliError;

#[derive(Debug, Parser)]
#[command(name = "vectorstyle", version, about = "Style-driven vector tile rasterizer")]
struct Cli {
    /// Config file (defaults to ~/.config/vectorstyle/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Render one tile to a PNG file
    Render(render::RenderArgs),
    /// Print the style's layers in draw order
    Inspect(inspect::InspectArgs),
    /// List the icons in the style's sprite atlas
    Sprites(sprites::SpritesArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        e.exit();
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = common::load_config(cli.config.as_deref())?;
    let _log_guard = init_logging(&config.logging)?;

    match cli.command {
        Commands::Render(args) => render::run(args, config.render).await,
        Commands::Inspect(args) => inspect::run(args).await,
        Commands::Sprites(args) => sprites::run(args).await,
    }
}
