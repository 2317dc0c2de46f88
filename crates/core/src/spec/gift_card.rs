//! Gift card requests.

use serde::{Deserialize, Serialize};

use crate::types::CurrencyCode;

/// Balance given to a gift card when none is requested, in minor units.
pub const DEFAULT_BALANCE_CENTS: u64 = 10_000;

/// Recipient given to a gift card when none is requested.
pub const DEFAULT_RECIPIENT_EMAIL: &str = "customer@tk.com";

/// Optional overrides for the gift card a fixture creates.
///
/// Absent fields fall back to EUR, [`DEFAULT_BALANCE_CENTS`] and
/// [`DEFAULT_RECIPIENT_EMAIL`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftCardSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<CurrencyCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_cents: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    /// Redeem the card on the order instead of handing its code to the test.
    ///
    /// Only meaningful for `with-items` orders.
    #[serde(default)]
    pub apply: bool,
}

impl GiftCardSpec {
    #[must_use]
    pub fn currency(&self) -> CurrencyCode {
        self.currency_code.unwrap_or_default()
    }

    #[must_use]
    pub fn balance(&self) -> u64 {
        self.balance_cents.unwrap_or(DEFAULT_BALANCE_CENTS)
    }

    #[must_use]
    pub fn recipient_email(&self) -> &str {
        self.customer_email
            .as_deref()
            .unwrap_or(DEFAULT_RECIPIENT_EMAIL)
    }
}
