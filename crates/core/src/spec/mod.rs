//! Order specifications.
//!
//! A test case describes the order it needs with [`FixtureParams`] (flat,
//! serde-friendly, every field optional). Converting it into an
//! [`OrderSpec`] validates it into the closed [`OrderShape`] sum type that the
//! composer dispatches on.

pub mod address;
pub mod gift_card;
pub mod line_item;
pub mod order;
pub mod params;
pub mod shape;
pub mod variant;

pub use address::{AddressInput, AddressesSpec};
pub use gift_card::{DEFAULT_BALANCE_CENTS, DEFAULT_RECIPIENT_EMAIL, GiftCardSpec};
pub use line_item::{ItemCode, LineItemSpec};
pub use order::OrderAttributes;
pub use params::FixtureParams;
pub use shape::{OrderShape, OrderSpec, WithItems};
pub use variant::OrderVariant;

/// Errors raised while turning fixture parameters into an [`OrderSpec`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// A field was set that the chosen variant never reads.
    #[error("field `{field}` is not used by `{variant}` orders")]
    FieldNotAllowed {
        /// The requested variant.
        variant: OrderVariant,
        /// The offending field.
        field: &'static str,
    },
    /// The variant tag is not one of the known shapes.
    #[error("unknown order variant: {0}")]
    UnknownVariant(String),
    /// A line item asked for zero units.
    #[error("line item quantity must be a positive integer")]
    ZeroQuantity,
    /// A line item entry named no code, or both a SKU and a bundle.
    #[error("line item must set exactly one of `sku_code` or `bundle_code`")]
    AmbiguousItemCode,
    /// A `CODE:QUANTITY` pair could not be parsed.
    #[error("invalid line item `{0}`, expected CODE or CODE:QUANTITY")]
    InvalidLineItem(String),
}
