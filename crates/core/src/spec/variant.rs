//! Order variant tags.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::SpecError;

/// The order shape a fixture asks for.
///
/// Tags are spelled the way test cases write them (`"bundle+skus"`,
/// `"gift-card"`). `no_line_items` is accepted as an alias of
/// `no-line-items`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderVariant {
    /// Any one catalog SKU, quantity 1.
    #[default]
    #[serde(rename = "plain")]
    Plain,
    /// An empty order.
    #[serde(rename = "no-line-items", alias = "no_line_items")]
    NoLineItems,
    /// A single fixed bundle.
    #[serde(rename = "bundle")]
    Bundle,
    /// A fixed bundle followed by a fixed SKU.
    #[serde(rename = "bundle+skus")]
    BundleWithSkus,
    /// A single digital good.
    #[serde(rename = "digital")]
    Digital,
    /// A purchased gift card sold as the order's line item.
    #[serde(rename = "gift-card")]
    GiftCard,
    /// Caller-supplied items plus optional gift card, coupon and addresses.
    #[serde(rename = "with-items")]
    WithItems,
}

impl OrderVariant {
    /// Every variant, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Plain,
        Self::NoLineItems,
        Self::Bundle,
        Self::BundleWithSkus,
        Self::Digital,
        Self::GiftCard,
        Self::WithItems,
    ];

    /// The tag as written in fixture parameters.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::NoLineItems => "no-line-items",
            Self::Bundle => "bundle",
            Self::BundleWithSkus => "bundle+skus",
            Self::Digital => "digital",
            Self::GiftCard => "gift-card",
            Self::WithItems => "with-items",
        }
    }
}

impl fmt::Display for OrderVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderVariant {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "no_line_items" {
            return Ok(Self::NoLineItems);
        }
        Self::ALL
            .into_iter()
            .find(|variant| variant.as_str() == s)
            .ok_or_else(|| SpecError::UnknownVariant(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_round_trips_every_tag() {
        for variant in OrderVariant::ALL {
            assert_eq!(variant.as_str().parse::<OrderVariant>().unwrap(), variant);
        }
    }

    #[test]
    fn test_underscore_alias() {
        assert_eq!(
            "no_line_items".parse::<OrderVariant>().unwrap(),
            OrderVariant::NoLineItems
        );
        let parsed: OrderVariant = serde_json::from_str("\"no_line_items\"").unwrap();
        assert_eq!(parsed, OrderVariant::NoLineItems);
    }

    #[test]
    fn test_unknown_variant() {
        assert!(matches!(
            "subscription".parse::<OrderVariant>(),
            Err(SpecError::UnknownVariant(tag)) if tag == "subscription"
        ));
    }

    #[test]
    fn test_default_is_plain() {
        assert_eq!(OrderVariant::default(), OrderVariant::Plain);
    }
}
