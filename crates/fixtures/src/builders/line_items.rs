//! Line item attachment.

use futures::future::{join_all, try_join_all};
use tracing::instrument;

use checkout_fixtures_core::{FailedLineItem, GiftCardId, ItemErrorPolicy, LineItemSpec, OrderId};

use crate::clients::StandardClient;
use crate::commerce::{CommerceError, LineItem, LineItemCreate, LineItemTarget};
use crate::error::{BuildStep, FixtureError};

/// Attaches line items to an order.
#[derive(Debug, Clone, Copy)]
pub struct LineItemBuilder<'a> {
    client: &'a StandardClient,
    policy: ItemErrorPolicy,
}

impl<'a> LineItemBuilder<'a> {
    #[must_use]
    pub const fn new(client: &'a StandardClient, policy: ItemErrorPolicy) -> Self {
        Self { client, policy }
    }

    /// Attach every item to the order concurrently.
    ///
    /// All creates are in flight at once and the batch is awaited as a unit.
    /// What a failed create does depends on the policy:
    ///
    /// - `Ignore` - logged and dropped
    /// - `Collect` - logged and returned
    /// - `FailFast` - the first failure aborts the batch; creates still in
    ///   flight are dropped
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::LineItem` under `FailFast` only.
    #[instrument(skip(self, items), fields(order_id = %order_id, count = items.len(), policy = %self.policy))]
    pub async fn attach_all(
        &self,
        order_id: &OrderId,
        items: &[LineItemSpec],
    ) -> Result<Vec<FailedLineItem>, FixtureError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        if self.policy == ItemErrorPolicy::FailFast {
            try_join_all(items.iter().map(|item| async move {
                self.attach(order_id, item)
                    .await
                    .map_err(|source| FixtureError::LineItem {
                        item: item.clone(),
                        source,
                    })
            }))
            .await?;
            return Ok(Vec::new());
        }

        let results = join_all(items.iter().map(|item| self.attach(order_id, item))).await;

        let mut failed = Vec::new();
        for (item, result) in items.iter().zip(results) {
            if let Err(e) = result {
                tracing::warn!(item = %item, error = %e, "Line item not attached");
                if self.policy == ItemErrorPolicy::Collect {
                    failed.push(FailedLineItem {
                        item: item.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(failed)
    }

    /// Attach a single SKU or bundle line item.
    ///
    /// # Errors
    ///
    /// Propagates the backend error; the policy does not apply.
    pub async fn attach(
        &self,
        order_id: &OrderId,
        item: &LineItemSpec,
    ) -> Result<LineItem, CommerceError> {
        let input = LineItemCreate::new(
            order_id.clone(),
            item.quantity,
            LineItemTarget::Code(item.code.clone()),
        );
        self.client.create_line_item(&input).await
    }

    /// Sell a gift card on the order as a single line item.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::Step` if the create fails; the policy does not
    /// apply.
    #[instrument(skip(self), fields(order_id = %order_id, gift_card_id = %gift_card_id))]
    pub async fn attach_gift_card(
        &self,
        order_id: &OrderId,
        gift_card_id: &GiftCardId,
    ) -> Result<LineItem, FixtureError> {
        let input = LineItemCreate::new(
            order_id.clone(),
            std::num::NonZeroU32::MIN,
            LineItemTarget::GiftCard(gift_card_id.clone()),
        );
        self.client
            .create_line_item(&input)
            .await
            .map_err(FixtureError::at(BuildStep::AttachLineItem))
    }
}
