//! Compose one order and report how to open it.

use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use checkout_fixtures::{FixtureConfig, FixtureProvider, LinkPage};
use checkout_fixtures_core::{
    BuildResult, FixtureParams, LineItemSpec, OrderVariant, SpecError, parse_code_quantity,
};

/// Flags collected from `order-fixture build`.
#[derive(Debug, Default)]
pub struct BuildRequest {
    pub variant: Option<OrderVariant>,
    pub spec: Option<PathBuf>,
    pub skus: Vec<String>,
    pub bundles: Vec<String>,
    pub coupon: Option<String>,
}

#[derive(Debug, Serialize)]
struct BuildReport<'a> {
    #[serde(flatten)]
    build: &'a BuildResult,
    checkout_url: Option<String>,
}

/// Build an order from the request and print the outcome.
///
/// # Errors
///
/// Returns an error if the fixture file cannot be read, the parameters are
/// invalid for the variant, configuration is missing, or the build fails.
pub async fn run(request: BuildRequest, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let base = match &request.spec {
        Some(path) => {
            info!(path = %path.display(), "Loading fixture parameters from file");
            let content = tokio::fs::read_to_string(path).await?;
            serde_yaml::from_str(&content)?
        }
        None => FixtureParams::default(),
    };
    let params = merge_flags(base, &request)?;

    let config = FixtureConfig::from_env()?;
    let provider = FixtureProvider::from_config(&config)?;

    info!(variant = %params.order, "Building order");
    let base_url = config.checkout_base_url.clone();
    let fixture = provider
        .checkout(params, |attributes| LinkPage::new(base_url, attributes))
        .await?;

    let report = BuildReport {
        build: &fixture.build,
        checkout_url: fixture.page.url().map(ToString::to_string),
    };
    print_report(&report, json)?;
    Ok(())
}

/// Layer command-line flags over parameters loaded from a file.
///
/// An explicit `--variant` wins. Item or coupon flags without one switch the
/// variant to `with-items`.
fn merge_flags(
    mut params: FixtureParams,
    request: &BuildRequest,
) -> Result<FixtureParams, SpecError> {
    for raw in &request.skus {
        let (code, quantity) = parse_code_quantity(raw)?;
        params.line_items.push(LineItemSpec::sku(code, quantity)?);
    }
    for raw in &request.bundles {
        let (code, quantity) = parse_code_quantity(raw)?;
        params.line_items.push(LineItemSpec::bundle(code, quantity)?);
    }
    if let Some(coupon) = &request.coupon {
        params.coupon_code = Some(coupon.clone());
    }

    let has_item_flags =
        !request.skus.is_empty() || !request.bundles.is_empty() || request.coupon.is_some();
    match request.variant {
        Some(variant) => params.order = variant,
        None if has_item_flags => params.order = OrderVariant::WithItems,
        None => {}
    }

    Ok(params)
}

#[allow(clippy::print_stdout)]
fn print_report(report: &BuildReport<'_>, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("order:        {}", report.build.order_id);
    if let Some(code) = &report.build.gift_card_code {
        println!("gift card:    {code}");
    }
    for failed in &report.build.failed_line_items {
        println!("failed item:  {} ({})", failed.item, failed.error);
    }
    if let Some(url) = &report.checkout_url {
        println!("checkout url: {url}");
    }
    Ok(())
}
