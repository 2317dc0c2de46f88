//! Build outcomes and the policies that shape them.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::spec::{LineItemSpec, SpecError};
use crate::types::OrderId;

/// What a finished build hands back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildResult {
    /// The order that was created; it exists in the backend.
    pub order_id: OrderId,
    /// Code of an activated gift card that was *not* applied to the order,
    /// left for the test to redeem.
    pub gift_card_code: Option<String>,
    /// Line items that failed to attach under [`ItemErrorPolicy::Collect`].
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_line_items: Vec<FailedLineItem>,
}

impl BuildResult {
    #[must_use]
    pub const fn new(order_id: OrderId) -> Self {
        Self {
            order_id,
            gift_card_code: None,
            failed_line_items: Vec::new(),
        }
    }
}

/// A requested line item the backend refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedLineItem {
    pub item: LineItemSpec,
    pub error: String,
}

/// How the line item builder treats a single failed create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemErrorPolicy {
    /// Log and drop the failure.
    Ignore,
    /// Log the failure and report it in [`BuildResult::failed_line_items`].
    #[default]
    Collect,
    /// Fail the build on the first failure.
    FailFast,
}

impl ItemErrorPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::Collect => "collect",
            Self::FailFast => "fail-fast",
        }
    }
}

impl fmt::Display for ItemErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "collect" => Ok(Self::Collect),
            "fail-fast" | "fail_fast" => Ok(Self::FailFast),
            other => Err(format!(
                "unknown line item error policy `{other}` (expected ignore, collect or fail-fast)"
            )),
        }
    }
}

/// What happens to a half-built order when a fatal step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CleanupPolicy {
    /// Leave the order in the backend for inspection.
    #[default]
    Leave,
    /// Best-effort delete of the order with elevated credentials.
    DeleteOrder,
}

/// Parse a `CODE` or `CODE:QUANTITY` pair (quantity defaults to 1).
///
/// # Errors
///
/// Returns [`SpecError::InvalidLineItem`] for an empty code or a non-numeric
/// quantity, and [`SpecError::ZeroQuantity`] for a zero quantity.
pub fn parse_code_quantity(s: &str) -> Result<(String, u32), SpecError> {
    let (code, quantity) = match s.split_once(':') {
        Some((code, qty)) => {
            let qty = qty
                .trim()
                .parse::<u32>()
                .map_err(|_| SpecError::InvalidLineItem(s.to_owned()))?;
            (code.trim(), qty)
        }
        None => (s.trim(), 1),
    };

    if code.is_empty() {
        return Err(SpecError::InvalidLineItem(s.to_owned()));
    }
    if quantity == 0 {
        return Err(SpecError::ZeroQuantity);
    }

    Ok((code.to_owned(), quantity))
}
