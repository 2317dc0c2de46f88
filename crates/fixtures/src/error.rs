//! Fixture error types.

use core::fmt;
use std::time::Duration;

use thiserror::Error;

use checkout_fixtures_core::{LineItemSpec, SpecError};

use crate::commerce::CommerceError;
use crate::config::ConfigError;

/// The remote step a fatal failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStep {
    AcquireToken,
    CreateOrder,
    ListSkus,
    AttachLineItem,
    CreateGiftCard,
    PurchaseGiftCard,
    ActivateGiftCard,
    ApplyGiftCard,
    ApplyCoupon,
    CreateBillingAddress,
    AttachBillingAddress,
    CreateShippingAddress,
    AttachShippingAddress,
}

impl BuildStep {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AcquireToken => "acquire token",
            Self::CreateOrder => "create order",
            Self::ListSkus => "list skus",
            Self::AttachLineItem => "attach line item",
            Self::CreateGiftCard => "create gift card",
            Self::PurchaseGiftCard => "purchase gift card",
            Self::ActivateGiftCard => "activate gift card",
            Self::ApplyGiftCard => "apply gift card",
            Self::ApplyCoupon => "apply coupon",
            Self::CreateBillingAddress => "create billing address",
            Self::AttachBillingAddress => "attach billing address",
            Self::CreateShippingAddress => "create shipping address",
            Self::AttachShippingAddress => "attach shipping address",
        }
    }
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that abort a fixture build.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid fixture params: {0}")]
    Spec(#[from] SpecError),

    #[error("Commerce API error: {0}")]
    Commerce(#[from] CommerceError),

    /// A fatal remote step failed.
    #[error("Failed to {step}: {source}")]
    Step {
        step: BuildStep,
        #[source]
        source: CommerceError,
    },

    /// The catalog returned no SKU to build a plain order from.
    #[error("Catalog has no SKUs to build a plain order from")]
    EmptyCatalog,

    /// A line item failed under the fail-fast policy.
    #[error("Failed to attach line item {item}: {source}")]
    LineItem {
        item: LineItemSpec,
        #[source]
        source: CommerceError,
    },

    #[error("Fixture build timed out after {0:?}")]
    Timeout(Duration),

    /// The consuming page could not be built or navigated.
    #[error("Checkout page error: {0}")]
    Page(String),
}

impl FixtureError {
    /// Adapter for `map_err` that tags a commerce error with its step.
    pub(crate) fn at(step: BuildStep) -> impl Fn(CommerceError) -> Self {
        move |source| Self::Step { step, source }
    }

    /// The failed step, when the error came from a remote call.
    #[must_use]
    pub const fn step(&self) -> Option<BuildStep> {
        match self {
            Self::Step { step, .. } => Some(*step),
            Self::LineItem { .. } => Some(BuildStep::AttachLineItem),
            _ => None,
        }
    }
}
