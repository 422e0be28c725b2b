//! Synthetic dataset generator for the fraudscope store
//! Writes seeded order/driver/customer/product/missing-item CSVs that
//! `ingest` can load, so the whole pipeline can be exercised without
//! production data.
//!
//! Usage:
//!   cargo run --release --bin generate_synthetic -- [OPTIONS]
//!
//! Options:
//!   --seed <N>       Random seed for reproducibility (default: 42)
//!   --output <PATH>  Output directory (default: data/raw)

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use fraudscope::{export, synthetic};
use tracing::info;

/// Seeded synthetic data generator
#[derive(Parser, Debug)]
#[command(name = "generate_synthetic")]
#[command(about = "Generate a seeded synthetic fraud dataset as CSV files")]
struct Args {
    /// Random seed; the same seed always produces the same dataset
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Output directory for the CSV files
    #[arg(long, default_value = "data/raw")]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();
    let data = synthetic::generate(args.seed);

    fs::create_dir_all(&args.output)?;
    export::write_csv(&args.output.join("orders.csv"), &data.orders)?;
    export::write_csv(&args.output.join("drivers.csv"), &data.drivers)?;
    export::write_csv(&args.output.join("customers.csv"), &data.customers)?;
    export::write_csv(&args.output.join("products.csv"), &data.products)?;
    export::write_csv(&args.output.join("missing_items.csv"), &data.missing_items)?;

    info!(
        "Wrote {} orders, {} drivers, {} customers, {} products, {} missing-item reports to {:?} (seed {})",
        data.orders.len(),
        data.drivers.len(),
        data.customers.len(),
        data.products.len(),
        data.missing_items.len(),
        args.output,
        args.seed
    );

    Ok(())
}
