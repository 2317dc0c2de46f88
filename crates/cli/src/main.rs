//! Order fixture CLI - build checkout test orders by hand.
//!
//! # Usage
//!
//! ```bash
//! # A bundle order, printed as a checkout link
//! order-fixture build --variant bundle
//!
//! # Custom items and a coupon
//! order-fixture build --sku TESLA5:2 --bundle SHIRTSETSINGLE --coupon SUMMER10
//!
//! # Everything from a YAML fixture file, as JSON
//! order-fixture build --spec fixtures/with-gift-card.yaml --json
//!
//! # Browse the catalog
//! order-fixture skus --limit 10
//! ```
//!
//! # Commands
//!
//! - `build` - Compose an order and print its checkout link
//! - `skus` - List catalog SKUs visible to the sales channel

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use checkout_fixtures_core::OrderVariant;

mod commands;

#[derive(Parser)]
#[command(name = "order-fixture")]
#[command(author, version, about = "Build checkout test orders on demand")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose an order and print its checkout link
    Build {
        /// Order variant (plain, no-line-items, bundle, bundle+skus, digital, gift-card, with-items)
        #[arg(short, long)]
        variant: Option<OrderVariant>,

        /// YAML fixture file with the full parameter set
        #[arg(short, long, value_name = "FILE")]
        spec: Option<PathBuf>,

        /// SKU line item as CODE or CODE:QTY (repeatable)
        #[arg(long = "sku", value_name = "CODE:QTY")]
        skus: Vec<String>,

        /// Bundle line item as CODE or CODE:QTY (repeatable)
        #[arg(long = "bundle", value_name = "CODE:QTY")]
        bundles: Vec<String>,

        /// Coupon code to apply
        #[arg(long)]
        coupon: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List catalog SKUs
    Skus {
        /// Number of SKUs to fetch (1-25)
        #[arg(short, long, default_value_t = 10)]
        limit: u8,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Build {
            variant,
            spec,
            skus,
            bundles,
            coupon,
            json,
        } => {
            let request = commands::build::BuildRequest {
                variant,
                spec,
                skus,
                bundles,
                coupon,
            };
            commands::build::run(request, json).await?;
        }
        Commands::Skus { limit } => commands::skus::list(limit).await?,
    }
    Ok(())
}
