//! Order composition.
//!
//! [`OrderComposer::compose`] turns an [`OrderSpec`] into a populated order:
//! it creates the base order, then dispatches on the [`OrderShape`] to the
//! builders. Every step after order creation knows the order id; nothing is
//! attached before the order exists.

use std::future::Future;
use std::num::NonZeroU32;
use std::time::Duration;

use tokio::time::{Instant, timeout_at};
use tracing::instrument;

use checkout_fixtures_core::{
    BuildResult, CleanupPolicy, ItemCode, ItemErrorPolicy, LineItemSpec, OrderId, OrderShape,
    OrderSpec, WithItems,
};

use crate::builders::{AddressAttacher, GiftCardBuilder, LineItemBuilder};
use crate::clients::{ClientSource, StandardClient};
use crate::commerce::{CommerceError, OrderUpdate, SkuQuery};
use crate::error::{BuildStep, FixtureError};

/// Bundle sold by `bundle` and `bundle+skus` orders.
pub const SHIRT_SET_BUNDLE: &str = "SHIRTSETSINGLE";
/// SKU added twice by `bundle+skus` orders.
pub const TESLA_SKU: &str = "TESLA5";
/// Digital SKU sold by `digital` orders.
pub const EBOOK_SKU: &str = "NFTEBOOK";

/// SKUs fetched when a `plain` order picks its item.
const PLAIN_SKU_PAGE: u8 = 10;

/// Longest a best-effort cleanup may take once a build has failed.
pub const CLEANUP_GRACE: Duration = Duration::from_secs(5);

/// Knobs for one composition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComposeOptions {
    pub line_item_errors: ItemErrorPolicy,
    pub cleanup: CleanupPolicy,
    /// Upper bound on the whole composition, order creation included.
    pub timeout: Option<Duration>,
}

/// The fixed line items of a variant; empty for variants without any.
#[must_use]
pub fn fixed_line_items(shape: &OrderShape) -> Vec<LineItemSpec> {
    let one = NonZeroU32::MIN;
    let bundle = || LineItemSpec::new(ItemCode::BundleCode(SHIRT_SET_BUNDLE.into()), one);

    match shape {
        OrderShape::Bundle => vec![bundle()],
        OrderShape::BundleWithSkus => vec![
            bundle(),
            LineItemSpec::new(
                ItemCode::SkuCode(TESLA_SKU.into()),
                one.saturating_add(1),
            ),
        ],
        OrderShape::Digital => vec![LineItemSpec::new(ItemCode::SkuCode(EBOOK_SKU.into()), one)],
        OrderShape::Plain
        | OrderShape::NoLineItems
        | OrderShape::GiftCard(_)
        | OrderShape::WithItems(_) => Vec::new(),
    }
}

/// Builds orders through a standard handle, reaching for elevated
/// credentials only when a step needs them.
pub struct OrderComposer<'a> {
    standard: &'a StandardClient,
    source: &'a dyn ClientSource,
    options: ComposeOptions,
}

impl<'a> OrderComposer<'a> {
    #[must_use]
    pub fn new(
        standard: &'a StandardClient,
        source: &'a dyn ClientSource,
        options: ComposeOptions,
    ) -> Self {
        Self {
            standard,
            source,
            options,
        }
    }

    /// Create and populate one order.
    ///
    /// Every call creates a new order, so two identical specs yield two
    /// distinct orders. A failure after order creation leaves the order in
    /// the backend unless the cleanup policy says otherwise.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error: order creation, an empty catalog for
    /// `plain`, any gift card, coupon or address step, a line item under
    /// fail-fast, or the timeout.
    pub async fn compose(&self, spec: &OrderSpec) -> Result<BuildResult, FixtureError> {
        let deadline = self.options.timeout.map(|limit| Instant::now() + limit);
        self.compose_until(spec, deadline).await
    }

    /// [`OrderComposer::compose`] against a deadline the caller already
    /// started, so time spent before composing counts against the same
    /// budget.
    ///
    /// # Errors
    ///
    /// Same as [`OrderComposer::compose`].
    #[instrument(skip(self, spec), fields(variant = %spec.variant()))]
    pub async fn compose_until(
        &self,
        spec: &OrderSpec,
        deadline: Option<Instant>,
    ) -> Result<BuildResult, FixtureError> {
        let limit = self.options.timeout.unwrap_or_default();
        let deadline = deadline.map(|at| (at, limit));

        let order = bounded(deadline, async {
            self.standard
                .create_order(&spec.attributes)
                .await
                .map_err(FixtureError::at(BuildStep::CreateOrder))
        })
        .await?;

        tracing::info!(order_id = %order.id, "Order created");

        match bounded(deadline, self.populate(&order.id, &spec.shape)).await {
            Ok(result) => {
                tracing::info!(
                    order_id = %result.order_id,
                    failed_line_items = result.failed_line_items.len(),
                    "Order composed"
                );
                Ok(result)
            }
            Err(e) => {
                tracing::error!(order_id = %order.id, error = %e, "Order composition failed");
                self.cleanup(&order.id).await;
                Err(e)
            }
        }
    }

    async fn populate(
        &self,
        order_id: &OrderId,
        shape: &OrderShape,
    ) -> Result<BuildResult, FixtureError> {
        let mut result = BuildResult::new(order_id.clone());
        let line_items = LineItemBuilder::new(self.standard, self.options.line_item_errors);

        match shape {
            OrderShape::Plain => {
                let sku = self
                    .standard
                    .list_skus(&SkuQuery::first(PLAIN_SKU_PAGE))
                    .await
                    .map_err(FixtureError::at(BuildStep::ListSkus))?
                    .into_iter()
                    .find(|sku| !sku.code.is_empty())
                    .ok_or(FixtureError::EmptyCatalog)?;

                let item = LineItemSpec::new(ItemCode::SkuCode(sku.code), NonZeroU32::MIN);
                line_items
                    .attach(order_id, &item)
                    .await
                    .map_err(FixtureError::at(BuildStep::AttachLineItem))?;
            }
            OrderShape::NoLineItems => {}
            OrderShape::Bundle | OrderShape::BundleWithSkus | OrderShape::Digital => {
                result.failed_line_items = line_items
                    .attach_all(order_id, &fixed_line_items(shape))
                    .await?;
            }
            OrderShape::GiftCard(gift_card) => {
                let card = GiftCardBuilder::new(self.standard)
                    .create_and_purchase(gift_card.as_ref())
                    .await?;
                line_items.attach_gift_card(order_id, &card.id).await?;
            }
            OrderShape::WithItems(with_items) => {
                self.populate_with_items(order_id, with_items, &line_items, &mut result)
                    .await?;
            }
        }

        Ok(result)
    }

    /// Line items, then gift card, then coupon, then addresses.
    async fn populate_with_items(
        &self,
        order_id: &OrderId,
        with_items: &WithItems,
        line_items: &LineItemBuilder<'_>,
        result: &mut BuildResult,
    ) -> Result<(), FixtureError> {
        result.failed_line_items = line_items
            .attach_all(order_id, &with_items.line_items)
            .await?;

        if let Some(spec) = &with_items.gift_card {
            let card = GiftCardBuilder::new(self.standard)
                .create_and_purchase(Some(spec))
                .await?;

            let elevated = self
                .source
                .elevated()
                .await
                .map_err(FixtureError::at(BuildStep::AcquireToken))?;
            let active = elevated
                .activate_gift_card(&card.id)
                .await
                .map_err(FixtureError::at(BuildStep::ActivateGiftCard))?;

            let code = active.code.or(card.code).ok_or_else(|| FixtureError::Step {
                step: BuildStep::ActivateGiftCard,
                source: CommerceError::Parse(format!("gift card {} has no code", card.id)),
            })?;

            if spec.apply {
                self.standard
                    .update_order(
                        order_id,
                        &OrderUpdate {
                            gift_card_code: Some(code),
                            ..OrderUpdate::default()
                        },
                    )
                    .await
                    .map_err(FixtureError::at(BuildStep::ApplyGiftCard))?;
                tracing::debug!(order_id = %order_id, "Gift card applied");
            } else {
                result.gift_card_code = Some(code);
            }
        }

        if let Some(coupon_code) = &with_items.coupon_code {
            self.standard
                .update_order(
                    order_id,
                    &OrderUpdate {
                        coupon_code: Some(coupon_code.clone()),
                        ..OrderUpdate::default()
                    },
                )
                .await
                .map_err(FixtureError::at(BuildStep::ApplyCoupon))?;
        }

        if let Some(addresses) = &with_items.addresses {
            AddressAttacher::new(self.standard)
                .attach(order_id, addresses)
                .await?;
        }

        Ok(())
    }

    /// Best-effort removal of a half-built order. Failures are only logged.
    ///
    /// Runs after the build deadline may already have passed, so it gets its
    /// own bound: [`CLEANUP_GRACE`], or the build timeout if that is shorter.
    async fn cleanup(&self, order_id: &OrderId) {
        if self.options.cleanup != CleanupPolicy::DeleteOrder {
            return;
        }

        let grace = self
            .options
            .timeout
            .map_or(CLEANUP_GRACE, |limit| limit.min(CLEANUP_GRACE));
        let delete = async {
            let elevated = self.source.elevated().await?;
            elevated.delete_order(order_id).await
        };

        match tokio::time::timeout(grace, delete).await {
            Ok(Ok(())) => tracing::info!(order_id = %order_id, "Half-built order deleted"),
            Ok(Err(e)) => {
                tracing::warn!(order_id = %order_id, error = %e, "Failed to delete half-built order");
            }
            Err(_) => {
                tracing::warn!(order_id = %order_id, ?grace, "Timed out deleting half-built order");
            }
        }
    }
}

/// Run `fut` against the composition deadline, if there is one.
async fn bounded<T>(
    deadline: Option<(Instant, Duration)>,
    fut: impl Future<Output = Result<T, FixtureError>>,
) -> Result<T, FixtureError> {
    match deadline {
        Some((at, limit)) => timeout_at(at, fut)
            .await
            .map_err(|_| FixtureError::Timeout(limit))?,
        None => fut.await,
    }
}
