//! Gift card creation and purchase.

use tracing::instrument;

use checkout_fixtures_core::GiftCardSpec;

use crate::clients::StandardClient;
use crate::commerce::{GiftCard, GiftCardCreate};
use crate::error::{BuildStep, FixtureError};

/// Creates purchased, not yet active, gift cards.
#[derive(Debug, Clone, Copy)]
pub struct GiftCardBuilder<'a> {
    client: &'a StandardClient,
}

impl<'a> GiftCardBuilder<'a> {
    #[must_use]
    pub const fn new(client: &'a StandardClient) -> Self {
        Self { client }
    }

    /// Create a gift card and mark it purchased.
    ///
    /// Absent fields fall back to EUR, a 10000 balance and `customer@tk.com`.
    /// The returned card still needs elevated activation before it can be
    /// redeemed.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::Step` if either call fails.
    #[instrument(skip(self, spec))]
    pub async fn create_and_purchase(
        &self,
        spec: Option<&GiftCardSpec>,
    ) -> Result<GiftCard, FixtureError> {
        let input = creation_input(spec);

        let card = self
            .client
            .create_gift_card(&input)
            .await
            .map_err(FixtureError::at(BuildStep::CreateGiftCard))?;

        let card = self
            .client
            .purchase_gift_card(&card.id)
            .await
            .map_err(FixtureError::at(BuildStep::PurchaseGiftCard))?;

        tracing::debug!(
            gift_card_id = %card.id,
            currency = %input.currency_code,
            balance_cents = input.balance_cents,
            "Gift card purchased"
        );

        Ok(card)
    }
}

fn creation_input(spec: Option<&GiftCardSpec>) -> GiftCardCreate {
    let spec = spec.cloned().unwrap_or_default();
    GiftCardCreate {
        currency_code: spec.currency(),
        balance_cents: spec.balance(),
        recipient_email: spec.recipient_email().to_owned(),
    }
}
