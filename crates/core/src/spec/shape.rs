//! The closed set of order shapes a build can produce.

use super::{AddressesSpec, GiftCardSpec, LineItemSpec, OrderAttributes, OrderVariant};
use crate::types::OrderId;

/// What to put on the order, by variant.
///
/// Each variant carries only the inputs it uses, so a `Bundle` order cannot
/// accidentally carry addresses.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum OrderShape {
    #[default]
    Plain,
    NoLineItems,
    Bundle,
    BundleWithSkus,
    Digital,
    /// The card is sold as the order's only line item; `apply` is not used.
    GiftCard(Option<GiftCardSpec>),
    WithItems(WithItems),
}

impl OrderShape {
    /// The variant tag of this shape.
    #[must_use]
    pub const fn variant(&self) -> OrderVariant {
        match self {
            Self::Plain => OrderVariant::Plain,
            Self::NoLineItems => OrderVariant::NoLineItems,
            Self::Bundle => OrderVariant::Bundle,
            Self::BundleWithSkus => OrderVariant::BundleWithSkus,
            Self::Digital => OrderVariant::Digital,
            Self::GiftCard(_) => OrderVariant::GiftCard,
            Self::WithItems(_) => OrderVariant::WithItems,
        }
    }
}

/// Inputs of a `with-items` order, applied in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WithItems {
    pub line_items: Vec<LineItemSpec>,
    pub gift_card: Option<GiftCardSpec>,
    pub coupon_code: Option<String>,
    pub addresses: Option<AddressesSpec>,
}

/// A complete, validated build request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderSpec {
    pub shape: OrderShape,
    pub attributes: OrderAttributes,
    /// Navigate to this order instead of the freshly built one.
    pub order_id: Option<OrderId>,
    /// Navigate with this access token instead of the fixture's own.
    pub token: Option<String>,
}

impl OrderSpec {
    #[must_use]
    pub fn new(shape: OrderShape) -> Self {
        Self {
            shape,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: OrderAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    #[must_use]
    pub const fn variant(&self) -> OrderVariant {
        self.shape.variant()
    }
}

impl From<OrderShape> for OrderSpec {
    fn from(shape: OrderShape) -> Self {
        Self::new(shape)
    }
}
