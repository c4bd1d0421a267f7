//! The `filterchain stock` command.

use clap::Args;
use filterchain_core::{Config, StockImages};

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct StockArgs {
    /// Seed for a reproducible image (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Generate a stock image and print its URI.
pub fn execute(args: StockArgs, config: &Config) -> anyhow::Result<()> {
    let dir = config.stock_dir();
    let uri = match args.seed {
        Some(seed) => StockImages::generate(&dir, seed)?,
        None => StockImages::random(&dir)?,
    };
    println!("{uri}");
    Ok(())
}
