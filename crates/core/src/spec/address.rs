//! Billing and shipping address requests.

use serde::{Deserialize, Serialize};

/// Address fields sent to the backend as-is.
///
/// Every field is optional so a test can supply only what its scenario needs;
/// the backend validates completeness.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Addresses to attach to a `with-items` order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressesSpec {
    /// Nothing is attached unless a billing address is given.
    #[serde(default, alias = "billing_address")]
    pub billing: Option<AddressInput>,
    #[serde(default, alias = "shipping_address")]
    pub shipping: Option<AddressInput>,
    /// Sent to the backend only when set explicitly.
    #[serde(default, alias = "same_shipping_address")]
    pub same_shipping_as_billing: Option<bool>,
}

impl AddressesSpec {
    /// The shipping address to create separately, if any.
    ///
    /// `None` when shipping mirrors billing or no shipping address was given.
    #[must_use]
    pub fn separate_shipping(&self) -> Option<&AddressInput> {
        if self.same_shipping_as_billing == Some(true) {
            return None;
        }
        self.shipping.as_ref()
    }
}
