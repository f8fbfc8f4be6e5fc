//! Onikuma G67 lighting driver CLI
//!
//! A command-line host for the per-key lighting session.

use clap::Parser;
use g67_driver::Rgb;
use tracing_subscriber::EnvFilter;

// CLI definitions
mod cli;
use cli::{Cli, Commands};

// Command handlers
mod commands;
use commands::{open_session, query, stream, Settings};

fn init_logging(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => "g67_driver=info",
        1 => "g67_driver=debug",
        _ => "g67_driver=trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let settings = Settings::resolve(&cli)?;
    let fps = settings.config.fps;

    match &cli.command {
        // === Inspection ===
        Commands::List { all } => query::list(&settings, *all)?,
        Commands::Info => query::info(&settings)?,
        Commands::Keys => query::keys(&settings)?,
        Commands::Dump { chunk, color } => query::dump(&settings, *chunk, color.clone())?,

        // === Streaming ===
        Commands::Solid { r, g, b } => {
            let mut session = open_session(&cli, &settings)?;
            stream::solid(&mut session, fps, Rgb::new(*r, *g, *b))?;
        }
        Commands::Key { name, r, g, b } => {
            let mut session = open_session(&cli, &settings)?;
            stream::key(&mut session, fps, name, Rgb::new(*r, *g, *b))?;
        }
        Commands::Blank => {
            let mut session = open_session(&cli, &settings)?;
            stream::blank(&mut session)?;
        }
    }

    Ok(())
}
