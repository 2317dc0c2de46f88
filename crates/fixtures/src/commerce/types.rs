//! Commerce API types.
//!
//! The backend speaks JSON:API: every resource travels as
//! `{"data": {"type", "id", "attributes", "relationships"}}`. Read-side
//! resources deserialize from that envelope into flat structs; write-side
//! inputs are serialized into it by [`ResourceBody`].

use std::collections::BTreeMap;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use checkout_fixtures_core::{
    AddressId, CurrencyCode, GiftCardId, ItemCode, LineItemId, OrderId, SkuId,
};

// =============================================================================
// Envelopes
// =============================================================================

/// Wrapper for a JSON:API document with a single resource.
#[derive(Debug, Clone, Deserialize)]
pub struct Document<T> {
    pub data: T,
}

/// Wrapper for a JSON:API document with a resource collection.
#[derive(Debug, Clone, Deserialize)]
pub struct ListDocument<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub meta: Option<ListMeta>,
}

/// Collection metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct ListMeta {
    #[serde(default)]
    pub record_count: u64,
    #[serde(default)]
    pub page_count: u64,
}

/// A resource object as returned by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceObject<A> {
    pub id: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub attributes: A,
}

/// JSON:API error document.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDocument {
    #[serde(default)]
    pub errors: Vec<ApiErrorObject>,
}

/// A single JSON:API error.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorObject {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub source: Option<ApiErrorSource>,
}

/// Where in the request an error points.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorSource {
    #[serde(default)]
    pub pointer: Option<String>,
}

impl ErrorDocument {
    /// Join every error into one line, preferring `detail` over `title`.
    #[must_use]
    pub fn summary(&self) -> Option<String> {
        let parts: Vec<String> = self
            .errors
            .iter()
            .filter_map(|e| {
                let text = e.detail.as_ref().or(e.title.as_ref())?;
                Some(match e.source.as_ref().and_then(|s| s.pointer.as_ref()) {
                    Some(pointer) => format!("{text} ({pointer})"),
                    None => text.clone(),
                })
            })
            .collect();
        (!parts.is_empty()).then(|| parts.join("; "))
    }
}

// =============================================================================
// Relationships
// =============================================================================

/// Resource collections the fixtures touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Orders,
    LineItems,
    Addresses,
    GiftCards,
    Skus,
}

impl ResourceType {
    /// Path segment and `type` member for this collection.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Orders => "orders",
            Self::LineItems => "line_items",
            Self::Addresses => "addresses",
            Self::GiftCards => "gift_cards",
            Self::Skus => "skus",
        }
    }
}

/// `{type, id}` pair identifying a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub id: String,
}

/// A relationship reference linking one resource to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub data: ResourceIdentifier,
}

impl Relationship {
    #[must_use]
    pub fn to(resource_type: ResourceType, id: impl Into<String>) -> Self {
        Self {
            data: ResourceIdentifier {
                resource_type,
                id: id.into(),
            },
        }
    }
}

/// Anything that can be the target of a relationship.
///
/// Implemented for both IDs and fetched resources, so callers can relate
/// whichever they hold.
pub trait Relate {
    fn relationship(&self) -> Relationship;
}

impl Relate for OrderId {
    fn relationship(&self) -> Relationship {
        Relationship::to(ResourceType::Orders, self.as_str())
    }
}

impl Relate for AddressId {
    fn relationship(&self) -> Relationship {
        Relationship::to(ResourceType::Addresses, self.as_str())
    }
}

impl Relate for GiftCardId {
    fn relationship(&self) -> Relationship {
        Relationship::to(ResourceType::GiftCards, self.as_str())
    }
}

/// Named relationships of a write payload.
pub type Relationships = BTreeMap<&'static str, Relationship>;

/// Write-side JSON:API document.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceBody<A> {
    pub data: ResourcePayload<A>,
}

/// Write-side resource object.
#[derive(Debug, Clone, Serialize)]
pub struct ResourcePayload<A> {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub attributes: A,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: Relationships,
}

impl<A> ResourceBody<A> {
    /// Body for a create call.
    #[must_use]
    pub const fn create(resource_type: ResourceType, attributes: A) -> Self {
        Self {
            data: ResourcePayload {
                resource_type,
                id: None,
                attributes,
                relationships: BTreeMap::new(),
            },
        }
    }

    /// Body for an update call on `id`.
    #[must_use]
    pub fn update(resource_type: ResourceType, id: impl Into<String>, attributes: A) -> Self {
        Self {
            data: ResourcePayload {
                resource_type,
                id: Some(id.into()),
                attributes,
                relationships: BTreeMap::new(),
            },
        }
    }

    #[must_use]
    pub fn with_relationships(mut self, relationships: Relationships) -> Self {
        self.data.relationships = relationships;
        self
    }
}

// =============================================================================
// Orders
// =============================================================================

/// An order, as much of it as the fixtures read back.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ResourceObject<OrderFields>")]
pub struct Order {
    pub id: OrderId,
    pub status: Option<String>,
    pub customer_email: Option<String>,
    pub gift_card_code: Option<String>,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFields {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    customer_email: Option<String>,
    #[serde(default)]
    gift_card_code: Option<String>,
    #[serde(default)]
    coupon_code: Option<String>,
}

impl From<ResourceObject<OrderFields>> for Order {
    fn from(object: ResourceObject<OrderFields>) -> Self {
        Self {
            id: OrderId::from(object.id),
            status: object.attributes.status,
            customer_email: object.attributes.customer_email,
            gift_card_code: object.attributes.gift_card_code,
            coupon_code: object.attributes.coupon_code,
        }
    }
}

impl Relate for Order {
    fn relationship(&self) -> Relationship {
        self.id.relationship()
    }
}

/// Changes to apply to an existing order.
///
/// Only set fields are sent; the update is blind (no read-modify-write).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderUpdate {
    pub gift_card_code: Option<String>,
    pub coupon_code: Option<String>,
    pub shipping_address_same_as_billing: Option<bool>,
    pub billing_address: Option<AddressId>,
    pub shipping_address: Option<AddressId>,
}

/// Attribute half of an [`OrderUpdate`].
#[derive(Debug, Clone, Serialize)]
pub struct OrderUpdateAttributes<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gift_card_code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<&'a str>,
    #[serde(
        rename = "_shipping_address_same_as_billing",
        skip_serializing_if = "Option::is_none"
    )]
    pub shipping_address_same_as_billing: Option<bool>,
}

impl OrderUpdate {
    #[must_use]
    pub fn attributes(&self) -> OrderUpdateAttributes<'_> {
        OrderUpdateAttributes {
            gift_card_code: self.gift_card_code.as_deref(),
            coupon_code: self.coupon_code.as_deref(),
            shipping_address_same_as_billing: self.shipping_address_same_as_billing,
        }
    }

    #[must_use]
    pub fn relationships(&self) -> Relationships {
        let mut relationships = Relationships::new();
        if let Some(id) = &self.billing_address {
            relationships.insert("billing_address", id.relationship());
        }
        if let Some(id) = &self.shipping_address {
            relationships.insert("shipping_address", id.relationship());
        }
        relationships
    }
}

// =============================================================================
// Line Items
// =============================================================================

/// A line item attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ResourceObject<LineItemFields>")]
pub struct LineItem {
    pub id: LineItemId,
    pub quantity: u32,
    pub sku_code: Option<String>,
    pub bundle_code: Option<String>,
    pub item_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LineItemFields {
    #[serde(default)]
    quantity: u32,
    #[serde(default)]
    sku_code: Option<String>,
    #[serde(default)]
    bundle_code: Option<String>,
    #[serde(default)]
    item_type: Option<String>,
}

impl From<ResourceObject<LineItemFields>> for LineItem {
    fn from(object: ResourceObject<LineItemFields>) -> Self {
        Self {
            id: LineItemId::from(object.id),
            quantity: object.attributes.quantity,
            sku_code: object.attributes.sku_code,
            bundle_code: object.attributes.bundle_code,
            item_type: object.attributes.item_type,
        }
    }
}

/// What a new line item sells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineItemTarget {
    /// A catalog SKU or bundle, by code.
    Code(ItemCode),
    /// A purchased gift card, by relationship.
    GiftCard(GiftCardId),
}

/// Input for creating a line item on an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItemCreate {
    pub order: OrderId,
    pub quantity: NonZeroU32,
    pub target: LineItemTarget,
}

/// Attribute half of a [`LineItemCreate`].
#[derive(Debug, Clone, Serialize)]
pub struct LineItemAttributes<'a> {
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku_code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_code: Option<&'a str>,
}

impl LineItemCreate {
    #[must_use]
    pub const fn new(order: OrderId, quantity: NonZeroU32, target: LineItemTarget) -> Self {
        Self {
            order,
            quantity,
            target,
        }
    }

    #[must_use]
    pub fn attributes(&self) -> LineItemAttributes<'_> {
        let (sku_code, bundle_code) = match &self.target {
            LineItemTarget::Code(ItemCode::SkuCode(code)) => (Some(code.as_str()), None),
            LineItemTarget::Code(ItemCode::BundleCode(code)) => (None, Some(code.as_str())),
            LineItemTarget::GiftCard(_) => (None, None),
        };
        LineItemAttributes {
            quantity: self.quantity.get(),
            sku_code,
            bundle_code,
        }
    }

    #[must_use]
    pub fn relationships(&self) -> Relationships {
        let mut relationships = Relationships::new();
        relationships.insert("order", self.order.relationship());
        if let LineItemTarget::GiftCard(id) = &self.target {
            relationships.insert("item", id.relationship());
        }
        relationships
    }
}

// =============================================================================
// Addresses
// =============================================================================

/// A created address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ResourceObject<AddressFields>")]
pub struct Address {
    pub id: AddressId,
    pub city: Option<String>,
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressFields {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    country_code: Option<String>,
}

impl From<ResourceObject<AddressFields>> for Address {
    fn from(object: ResourceObject<AddressFields>) -> Self {
        Self {
            id: AddressId::from(object.id),
            city: object.attributes.city,
            country_code: object.attributes.country_code,
        }
    }
}

impl Relate for Address {
    fn relationship(&self) -> Relationship {
        self.id.relationship()
    }
}

// =============================================================================
// Gift Cards
// =============================================================================

/// A gift card.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ResourceObject<GiftCardFields>")]
pub struct GiftCard {
    pub id: GiftCardId,
    pub code: Option<String>,
    pub status: Option<String>,
    pub currency_code: Option<String>,
    pub balance_cents: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GiftCardFields {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    currency_code: Option<String>,
    #[serde(default)]
    balance_cents: Option<u64>,
}

impl From<ResourceObject<GiftCardFields>> for GiftCard {
    fn from(object: ResourceObject<GiftCardFields>) -> Self {
        Self {
            id: GiftCardId::from(object.id),
            code: object.attributes.code,
            status: object.attributes.status,
            currency_code: object.attributes.currency_code,
            balance_cents: object.attributes.balance_cents,
        }
    }
}

impl Relate for GiftCard {
    fn relationship(&self) -> Relationship {
        self.id.relationship()
    }
}

/// Input for creating a gift card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GiftCardCreate {
    pub currency_code: CurrencyCode,
    pub balance_cents: u64,
    pub recipient_email: String,
}

/// Lifecycle transitions applied through a gift card update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiftCardAction {
    /// Marks the card as paid for.
    Purchase,
    /// Makes the card redeemable. Requires elevated credentials.
    Activate,
}

/// Attribute half of a gift card transition.
#[derive(Debug, Clone, Serialize)]
pub struct GiftCardActionAttributes {
    #[serde(rename = "_purchase", skip_serializing_if = "Option::is_none")]
    pub purchase: Option<bool>,
    #[serde(rename = "_activate", skip_serializing_if = "Option::is_none")]
    pub activate: Option<bool>,
}

impl GiftCardAction {
    #[must_use]
    pub const fn attributes(self) -> GiftCardActionAttributes {
        match self {
            Self::Purchase => GiftCardActionAttributes {
                purchase: Some(true),
                activate: None,
            },
            Self::Activate => GiftCardActionAttributes {
                purchase: None,
                activate: Some(true),
            },
        }
    }
}

// =============================================================================
// SKUs
// =============================================================================

/// A catalog SKU.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ResourceObject<SkuFields>")]
pub struct Sku {
    pub id: SkuId,
    pub code: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkuFields {
    #[serde(default)]
    code: String,
    #[serde(default)]
    name: Option<String>,
}

impl From<ResourceObject<SkuFields>> for Sku {
    fn from(object: ResourceObject<SkuFields>) -> Self {
        Self {
            id: SkuId::from(object.id),
            code: object.attributes.code,
            name: object.attributes.name,
        }
    }
}

/// Paging for SKU listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkuQuery {
    /// Page size, clamped to the backend's 1..=25 range.
    pub page_size: u8,
}

impl SkuQuery {
    pub const MAX_PAGE_SIZE: u8 = 25;

    #[must_use]
    pub fn first(page_size: u8) -> Self {
        Self {
            page_size: page_size.clamp(1, Self::MAX_PAGE_SIZE),
        }
    }
}

impl Default for SkuQuery {
    fn default() -> Self {
        Self::first(10)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_line_item_body_for_sku() {
        let input = LineItemCreate::new(
            OrderId::new("ord1"),
            NonZeroU32::new(2).unwrap(),
            LineItemTarget::Code(ItemCode::SkuCode("TESLA5".into())),
        );
        let body = ResourceBody::create(ResourceType::LineItems, input.attributes())
            .with_relationships(input.relationships());

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "data": {
                    "type": "line_items",
                    "attributes": {"quantity": 2, "sku_code": "TESLA5"},
                    "relationships": {
                        "order": {"data": {"type": "orders", "id": "ord1"}}
                    }
                }
            })
        );
    }

    #[test]
    fn test_line_item_body_for_gift_card() {
        let input = LineItemCreate::new(
            OrderId::new("ord1"),
            NonZeroU32::MIN,
            LineItemTarget::GiftCard(GiftCardId::new("gc1")),
        );
        let body = serde_json::to_value(
            ResourceBody::create(ResourceType::LineItems, input.attributes())
                .with_relationships(input.relationships()),
        )
        .unwrap();

        assert_eq!(body["data"]["attributes"], json!({"quantity": 1}));
        assert_eq!(
            body["data"]["relationships"]["item"],
            json!({"data": {"type": "gift_cards", "id": "gc1"}})
        );
    }

    #[test]
    fn test_order_update_body() {
        let update = OrderUpdate {
            billing_address: Some(AddressId::new("addr1")),
            shipping_address_same_as_billing: Some(true),
            ..OrderUpdate::default()
        };
        let body = serde_json::to_value(
            ResourceBody::update(ResourceType::Orders, "ord1", update.attributes())
                .with_relationships(update.relationships()),
        )
        .unwrap();

        assert_eq!(
            body,
            json!({
                "data": {
                    "type": "orders",
                    "id": "ord1",
                    "attributes": {"_shipping_address_same_as_billing": true},
                    "relationships": {
                        "billing_address": {"data": {"type": "addresses", "id": "addr1"}}
                    }
                }
            })
        );
    }

    #[test]
    fn test_gift_card_action_attributes() {
        assert_eq!(
            serde_json::to_value(GiftCardAction::Purchase.attributes()).unwrap(),
            json!({"_purchase": true})
        );
        assert_eq!(
            serde_json::to_value(GiftCardAction::Activate.attributes()).unwrap(),
            json!({"_activate": true})
        );
    }

    #[test]
    fn test_gift_card_deserializes_from_resource_object() {
        let doc: Document<GiftCard> = serde_json::from_value(json!({
            "data": {
                "id": "gc1",
                "type": "gift_cards",
                "attributes": {
                    "code": "b4c2-88a1",
                    "status": "active",
                    "currency_code": "EUR",
                    "balance_cents": 10000
                }
            }
        }))
        .unwrap();

        assert_eq!(doc.data.id, GiftCardId::new("gc1"));
        assert_eq!(doc.data.code.as_deref(), Some("b4c2-88a1"));
        assert_eq!(doc.data.balance_cents, Some(10_000));
    }

    #[test]
    fn test_error_summary() {
        let doc: ErrorDocument = serde_json::from_value(json!({
            "errors": [
                {"title": "is invalid", "detail": "sku_code - is invalid", "source": {"pointer": "/data/attributes/sku_code"}},
                {"title": "out of stock"}
            ]
        }))
        .unwrap();

        assert_eq!(
            doc.summary().unwrap(),
            "sku_code - is invalid (/data/attributes/sku_code); out of stock"
        );
        assert!(ErrorDocument { errors: vec![] }.summary().is_none());
    }

    #[test]
    fn test_sku_query_clamps_page_size() {
        assert_eq!(SkuQuery::first(0).page_size, 1);
        assert_eq!(SkuQuery::first(200).page_size, 25);
    }
}
