//! Filterchain CLI - chained image filters that end in a gallery save or an upload.
//!
//! Every run first sweeps the scratch directory, then applies the selected
//! filters in a fixed order, then saves or uploads the result.
//!
//! # Usage
//!
//! ```bash
//! # Blur and grayscale a photo, then save it to the gallery
//! filterchain run photo.jpg --grayscale --blur --save
//!
//! # Show the steps a request would run
//! filterchain plan photo.jpg --watercolor
//!
//! # Make a stock image to play with
//! filterchain stock --seed 7
//! ```

use clap::{CommandFactory, Parser, Subcommand};
use std::io::IsTerminal;

mod cli;
mod logging;

/// Filterchain - apply chained image filters, then save or upload.
#[derive(Parser, Debug)]
#[command(name = "filterchain")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Filter an image and save or upload the result
    Run(cli::run::FilterArgs),

    /// Print the steps a request would run, without running them
    Plan(cli::run::FilterArgs),

    /// Delete leftover scratch images
    Cleanup,

    /// Generate a stock image to filter
    Stock(cli::stock::StockArgs),

    /// List images saved to the gallery
    Gallery,

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match filterchain_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `filterchain config path`."
            );
            filterchain_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Filterchain v{}", filterchain_core::VERSION);

    match cli.command {
        Some(Commands::Run(args)) => cli::run::execute(args, config).await,
        Some(Commands::Plan(args)) => cli::plan::execute(args, &config),
        Some(Commands::Cleanup) => cli::cleanup::execute(&config),
        Some(Commands::Stock(args)) => cli::stock::execute(args, &config),
        Some(Commands::Gallery) => cli::gallery::execute(&config),
        Some(Commands::Config(args)) => cli::config::execute(args).await,
        None if std::io::stdin().is_terminal() && std::io::stderr().is_terminal() => {
            cli::interactive::run(config).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
