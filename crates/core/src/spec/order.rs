//! Attributes for the base order.

use serde::{Deserialize, Serialize};

use crate::types::{CountryCode, LanguageCode};

/// Order attributes sent with the create call.
///
/// The typed fields cover what checkout tests usually pin; anything else the
/// backend accepts can ride along in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<LanguageCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_country_code_lock: Option<CountryCode>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl OrderAttributes {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.language_code.is_none()
            && self.customer_email.is_none()
            && self.shipping_country_code_lock.is_none()
            && self.extra.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_attributes_serialize_to_empty_object() {
        let attrs = OrderAttributes::default();
        assert!(attrs.is_empty());
        assert_eq!(serde_json::to_value(&attrs).unwrap(), serde_json::json!({}));
    }

    #[test]
    fn test_extra_fields_pass_through() {
        let attrs: OrderAttributes = serde_json::from_str(
            r#"{"language_code": "it", "reference": "e2e-42", "customer_email": "a@b.it"}"#,
        )
        .unwrap();
        assert_eq!(attrs.language_code, Some(LanguageCode::It));
        assert_eq!(attrs.extra.get("reference"), Some(&serde_json::json!("e2e-42")));

        let round = serde_json::to_value(&attrs).unwrap();
        assert_eq!(round["reference"], "e2e-42");
        assert_eq!(round["customer_email"], "a@b.it");
    }
}
