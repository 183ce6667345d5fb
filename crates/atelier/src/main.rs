//! Atelier CLI - static-site asset pipeline.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "atelier")]
#[command(about = "Static-site asset pipeline with live reload")]
#[command(version)]
pub struct Cli {
    /// Defaults to `dev` when omitted
    #[command(subcommand)]
    command: Option<Commands>,

    /// Project root containing the source tree and atelier.toml
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// One-shot build of every asset category
    Build {
        /// Output directory (defaults to config or "dist")
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Build, then serve with live reload and rebuild on change
    Dev {
        /// Port to listen on (defaults to config or 3000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    // Execute command
    match cli.command.unwrap_or(Commands::Dev {
        port: None,
        no_open: false,
    }) {
        Commands::Build { out } => {
            commands::build::run(&cli.root, out).await?;
        }
        Commands::Dev { port, no_open } => {
            commands::dev::run(&cli.root, port, no_open).await?;
        }
    }

    Ok(())
}
