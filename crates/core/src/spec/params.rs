//! Flat fixture parameters, as test cases write them.

use serde::{Deserialize, Serialize};

use super::{
    AddressesSpec, GiftCardSpec, LineItemSpec, OrderAttributes, OrderShape, OrderSpec,
    OrderVariant, SpecError, WithItems,
};
use crate::types::OrderId;

/// Overrides a test case passes to the checkout fixture.
///
/// Every field is optional; `order` defaults to `plain`. Convert into an
/// [`OrderSpec`] with `try_into()`, which rejects fields the chosen variant
/// would silently ignore.
///
/// ```
/// use checkout_fixtures_core::{FixtureParams, OrderSpec, OrderVariant};
///
/// let params: FixtureParams = serde_json::from_str(
///     r#"{"order": "with-items", "line_items": [{"sku_code": "TESLA5", "quantity": 2}]}"#,
/// ).unwrap();
/// let spec: OrderSpec = params.try_into().unwrap();
/// assert_eq!(spec.variant(), OrderVariant::WithItems);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureParams {
    #[serde(default)]
    pub order: OrderVariant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default)]
    pub order_attributes: OrderAttributes,
    #[serde(default, alias = "line_items_attributes", skip_serializing_if = "Vec::is_empty")]
    pub line_items: Vec<LineItemSpec>,
    #[serde(default, alias = "gift_card_attributes", skip_serializing_if = "Option::is_none")]
    pub gift_card: Option<GiftCardSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addresses: Option<AddressesSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
}

impl FixtureParams {
    /// Parameters for the given variant with everything else defaulted.
    #[must_use]
    pub fn variant(order: OrderVariant) -> Self {
        Self {
            order,
            ..Self::default()
        }
    }

    fn reject_with_items_fields(&self, allow_gift_card: bool) -> Result<(), SpecError> {
        let not_allowed = |field| SpecError::FieldNotAllowed {
            variant: self.order,
            field,
        };
        if !self.line_items.is_empty() {
            return Err(not_allowed("line_items"));
        }
        if self.addresses.is_some() {
            return Err(not_allowed("addresses"));
        }
        if self.coupon_code.is_some() {
            return Err(not_allowed("coupon_code"));
        }
        if !allow_gift_card && self.gift_card.is_some() {
            return Err(not_allowed("gift_card"));
        }
        Ok(())
    }
}

impl TryFrom<FixtureParams> for OrderSpec {
    type Error = SpecError;

    fn try_from(params: FixtureParams) -> Result<Self, Self::Error> {
        let shape = match params.order {
            OrderVariant::WithItems => OrderShape::WithItems(WithItems {
                line_items: params.line_items,
                gift_card: params.gift_card,
                coupon_code: params.coupon_code,
                addresses: params.addresses,
            }),
            OrderVariant::GiftCard => {
                params.reject_with_items_fields(true)?;
                OrderShape::GiftCard(params.gift_card)
            }
            fixed => {
                params.reject_with_items_fields(false)?;
                match fixed {
                    OrderVariant::NoLineItems => OrderShape::NoLineItems,
                    OrderVariant::Bundle => OrderShape::Bundle,
                    OrderVariant::BundleWithSkus => OrderShape::BundleWithSkus,
                    OrderVariant::Digital => OrderShape::Digital,
                    _ => OrderShape::Plain,
                }
            }
        };

        Ok(Self {
            shape,
            attributes: params.order_attributes,
            order_id: params.order_id.map(OrderId::from),
            token: params.token,
        })
    }
}
