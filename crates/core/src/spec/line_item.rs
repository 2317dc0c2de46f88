//! Line item requests.

use core::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use super::SpecError;

/// What a line item points at: a single SKU or a bundle.
///
/// A [`LineItemSpec`] carries it as the backend's attribute name:
/// `{"quantity": 2, "sku_code": "TESLA5"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemCode {
    SkuCode(String),
    BundleCode(String),
}

impl ItemCode {
    /// The code itself, without its kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::SkuCode(code) | Self::BundleCode(code) => code,
        }
    }

    /// Whether the code refers to a bundle.
    #[must_use]
    pub const fn is_bundle(&self) -> bool {
        matches!(self, Self::BundleCode(_))
    }
}

impl fmt::Display for ItemCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SkuCode(code) => write!(f, "sku {code}"),
            Self::BundleCode(code) => write!(f, "bundle {code}"),
        }
    }
}

/// A quantity of one SKU or bundle to put on an order.
///
/// Entries must name exactly one of `sku_code` or `bundle_code`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "LineItemEntry", into = "LineItemEntry")]
pub struct LineItemSpec {
    /// Units to order; always at least one.
    pub quantity: NonZeroU32,
    /// The SKU or bundle being ordered.
    pub code: ItemCode,
}

/// Wire form of a [`LineItemSpec`].
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct LineItemEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sku_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bundle_code: Option<String>,
    quantity: u32,
}

impl TryFrom<LineItemEntry> for LineItemSpec {
    type Error = SpecError;

    fn try_from(entry: LineItemEntry) -> Result<Self, Self::Error> {
        let quantity = NonZeroU32::new(entry.quantity).ok_or(SpecError::ZeroQuantity)?;
        let code = match (entry.sku_code, entry.bundle_code) {
            (Some(sku), None) => ItemCode::SkuCode(sku),
            (None, Some(bundle)) => ItemCode::BundleCode(bundle),
            _ => return Err(SpecError::AmbiguousItemCode),
        };
        Ok(Self::new(code, quantity))
    }
}

impl From<LineItemSpec> for LineItemEntry {
    fn from(item: LineItemSpec) -> Self {
        let (sku_code, bundle_code) = match item.code {
            ItemCode::SkuCode(code) => (Some(code), None),
            ItemCode::BundleCode(code) => (None, Some(code)),
        };
        Self {
            sku_code,
            bundle_code,
            quantity: item.quantity.get(),
        }
    }
}

impl LineItemSpec {
    /// Create a line item request.
    #[must_use]
    pub const fn new(code: ItemCode, quantity: NonZeroU32) -> Self {
        Self { quantity, code }
    }

    /// A SKU-coded line item.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::ZeroQuantity`] if `quantity` is zero.
    pub fn sku(code: impl Into<String>, quantity: u32) -> Result<Self, SpecError> {
        let quantity = NonZeroU32::new(quantity).ok_or(SpecError::ZeroQuantity)?;
        Ok(Self::new(ItemCode::SkuCode(code.into()), quantity))
    }

    /// A bundle-coded line item.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::ZeroQuantity`] if `quantity` is zero.
    pub fn bundle(code: impl Into<String>, quantity: u32) -> Result<Self, SpecError> {
        let quantity = NonZeroU32::new(quantity).ok_or(SpecError::ZeroQuantity)?;
        Ok(Self::new(ItemCode::BundleCode(code.into()), quantity))
    }
}

impl fmt::Display for LineItemSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{}", self.code, self.quantity)
    }
}
