//! List catalog SKUs through the sales-channel credentials.

use tracing::info;

use checkout_fixtures::commerce::SkuQuery;
use checkout_fixtures::{ClientProvider, ClientSource, FixtureConfig};

/// Print up to `limit` SKU codes with their names.
///
/// # Errors
///
/// Returns an error if configuration is missing or the backend call fails.
#[allow(clippy::print_stdout)]
pub async fn list(limit: u8) -> Result<(), Box<dyn std::error::Error>> {
    let config = FixtureConfig::from_env()?;
    let provider = ClientProvider::new(config.commerce)?;

    let client = provider.standard().await?;
    let skus = client.list_skus(&SkuQuery::first(limit)).await?;
    info!(count = skus.len(), "Fetched SKUs");

    for sku in &skus {
        println!("{:<24} {}", sku.code, sku.name.as_deref().unwrap_or(""));
    }
    Ok(())
}
