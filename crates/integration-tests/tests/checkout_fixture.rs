//! Live checkout fixture scenarios.
//!
//! These tests require:
//! - Sales channel and integration credentials for a sandbox organization
//! - A catalog containing `SHIRTSETSINGLE`, `TESLA5` and `NFTEBOOK`
//! - An active `SUMMER10` promotion
//!
//! Run with: cargo test -p checkout-fixtures-integration-tests -- --ignored

use serde_json::json;

use checkout_fixtures_core::{FixtureParams, OrderVariant};
use checkout_fixtures_integration_tests::{TestContext, unique_email};

fn context() -> TestContext {
    TestContext::from_env().expect("Failed to load fixture configuration")
}

fn params(value: serde_json::Value) -> FixtureParams {
    serde_json::from_value(value).expect("Invalid fixture parameters")
}

// ============================================================================
// Fixed Variants
// ============================================================================

#[tokio::test]
#[ignore = "Requires commerce backend credentials"]
async fn test_plain_order() {
    let ctx = context();
    let fixture = ctx
        .checkout(FixtureParams::default())
        .await
        .expect("Failed to build plain order");

    assert!(fixture.build.failed_line_items.is_empty());
    let url = fixture.page.url().expect("Page never navigated");
    assert!(url.path().ends_with(fixture.build.order_id.as_str()));
    assert!(url.query().is_some_and(|q| q.starts_with("accessToken=")));
}

#[tokio::test]
#[ignore = "Requires commerce backend credentials"]
async fn test_fixed_variants() {
    let ctx = context();
    for variant in [
        OrderVariant::NoLineItems,
        OrderVariant::Bundle,
        OrderVariant::BundleWithSkus,
        OrderVariant::Digital,
    ] {
        let fixture = ctx
            .checkout(FixtureParams::variant(variant))
            .await
            .unwrap_or_else(|e| panic!("Failed to build {variant} order: {e}"));
        assert!(
            fixture.build.failed_line_items.is_empty(),
            "{variant}: {:?}",
            fixture.build.failed_line_items
        );
    }
}

#[tokio::test]
#[ignore = "Requires commerce backend credentials"]
async fn test_gift_card_order() {
    let ctx = context();
    let fixture = ctx
        .checkout(params(json!({
            "order": "gift-card",
            "gift_card": {"balance_cents": 5000, "customer_email": unique_email()}
        })))
        .await
        .expect("Failed to build gift card order");

    assert!(fixture.build.gift_card_code.is_none());
    assert!(fixture.page.attributes().gift_card_code.is_none());
}

// ============================================================================
// With Items
// ============================================================================

#[tokio::test]
#[ignore = "Requires commerce backend credentials"]
async fn test_items_and_coupon() {
    let ctx = context();
    let fixture = ctx
        .checkout(params(json!({
            "order": "with-items",
            "order_attributes": {"customer_email": unique_email(), "language_code": "en"},
            "line_items": [
                {"sku_code": "TESLA5", "quantity": 2},
                {"bundle_code": "SHIRTSETSINGLE", "quantity": 1}
            ],
            "coupon_code": "SUMMER10"
        })))
        .await
        .expect("Failed to build order with items");

    assert!(fixture.build.failed_line_items.is_empty());
    assert!(fixture.build.gift_card_code.is_none());
}

#[tokio::test]
#[ignore = "Requires commerce backend credentials"]
async fn test_unknown_sku_is_collected() {
    let ctx = context();
    let missing = format!("MISSING-{}", uuid::Uuid::new_v4().simple());
    let fixture = ctx
        .checkout(params(json!({
            "order": "with-items",
            "line_items": [
                {"sku_code": "TESLA5", "quantity": 1},
                {"sku_code": missing, "quantity": 1}
            ]
        })))
        .await
        .expect("Unknown SKU should not fail the build");

    assert_eq!(fixture.build.failed_line_items.len(), 1);
    assert_eq!(
        fixture.build.failed_line_items[0].item.code.as_str(),
        missing
    );
}

#[tokio::test]
#[ignore = "Requires commerce backend credentials"]
async fn test_gift_card_surfaced_for_redemption() {
    let ctx = context();
    let fixture = ctx
        .checkout(params(json!({
            "order": "with-items",
            "line_items": [{"sku_code": "TESLA5", "quantity": 1}],
            "gift_card": {"currency_code": "EUR", "balance_cents": 2500}
        })))
        .await
        .expect("Failed to build order with gift card");

    let code = fixture
        .build
        .gift_card_code
        .as_deref()
        .expect("Gift card code not surfaced");
    assert!(!code.is_empty());
    assert_eq!(
        fixture.page.attributes().gift_card_code.as_deref(),
        Some(code)
    );
}

#[tokio::test]
#[ignore = "Requires commerce backend credentials"]
async fn test_gift_card_applied_to_order() {
    let ctx = context();
    let fixture = ctx
        .checkout(params(json!({
            "order": "with-items",
            "line_items": [{"sku_code": "TESLA5", "quantity": 1}],
            "gift_card": {"apply": true}
        })))
        .await
        .expect("Failed to build order with applied gift card");

    assert!(fixture.build.gift_card_code.is_none());
}

// ============================================================================
// Addresses
// ============================================================================

fn address(city: &str) -> serde_json::Value {
    json!({
        "first_name": "Test",
        "last_name": "Customer",
        "line_1": "Via Roma 1",
        "city": city,
        "zip_code": "20100",
        "state_code": "MI",
        "country_code": "IT",
        "phone": "+39 02 0000000",
        "email": unique_email()
    })
}

#[tokio::test]
#[ignore = "Requires commerce backend credentials"]
async fn test_shipping_same_as_billing() {
    let ctx = context();
    ctx.checkout(params(json!({
        "order": "with-items",
        "line_items": [{"sku_code": "TESLA5", "quantity": 1}],
        "addresses": {
            "billing": address("Milano"),
            "shipping": address("Torino"),
            "same_shipping_as_billing": true
        }
    })))
    .await
    .expect("Failed to build order with mirrored shipping");
}

#[tokio::test]
#[ignore = "Requires commerce backend credentials"]
async fn test_separate_shipping_address() {
    let ctx = context();
    ctx.checkout(params(json!({
        "order": "with-items",
        "line_items": [{"sku_code": "TESLA5", "quantity": 1}],
        "addresses": {
            "billing": address("Milano"),
            "shipping": address("Torino"),
            "same_shipping_as_billing": false
        }
    })))
    .await
    .expect("Failed to build order with separate shipping");
}

// ============================================================================
// Overrides
// ============================================================================

#[tokio::test]
#[ignore = "Requires commerce backend credentials"]
async fn test_overrides_target_existing_order() {
    let ctx = context();
    let first = ctx
        .checkout(FixtureParams::variant(OrderVariant::Bundle))
        .await
        .expect("Failed to build first order");

    let second = ctx
        .checkout(params(json!({
            "order": "no-line-items",
            "order_id": first.build.order_id.as_str(),
            "token": "customer-token"
        })))
        .await
        .expect("Failed to build second order");

    assert_eq!(second.target.order_id, first.build.order_id);
    assert_ne!(second.build.order_id, first.build.order_id);
    let url = second.page.url().expect("Page never navigated");
    assert_eq!(url.query(), Some("accessToken=customer-token"));
}
