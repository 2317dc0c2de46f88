//! Billing and shipping address attachment.

use tracing::instrument;

use checkout_fixtures_core::{AddressId, AddressesSpec, OrderId};

use crate::clients::StandardClient;
use crate::commerce::OrderUpdate;
use crate::error::{BuildStep, FixtureError};

/// Addresses linked to an order by [`AddressAttacher::attach`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedAddresses {
    pub billing: AddressId,
    /// `None` when shipping mirrors billing or none was supplied.
    pub shipping: Option<AddressId>,
}

/// Creates addresses and links them to an order.
#[derive(Debug, Clone, Copy)]
pub struct AddressAttacher<'a> {
    client: &'a StandardClient,
}

impl<'a> AddressAttacher<'a> {
    #[must_use]
    pub const fn new(client: &'a StandardClient) -> Self {
        Self { client }
    }

    /// Create the billing address and link it, then the shipping address.
    ///
    /// Nothing happens without a billing address. The billing link and the
    /// same-as-billing flag go out in one update; the flag is omitted when
    /// unset. A shipping address is created only when
    /// [`AddressesSpec::separate_shipping`] yields one.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::Step` on the first failed call.
    #[instrument(skip(self, addresses), fields(order_id = %order_id))]
    pub async fn attach(
        &self,
        order_id: &OrderId,
        addresses: &AddressesSpec,
    ) -> Result<Option<AttachedAddresses>, FixtureError> {
        let Some(billing) = &addresses.billing else {
            return Ok(None);
        };

        let billing = self
            .client
            .create_address(billing)
            .await
            .map_err(FixtureError::at(BuildStep::CreateBillingAddress))?;

        self.client
            .update_order(
                order_id,
                &OrderUpdate {
                    billing_address: Some(billing.id.clone()),
                    shipping_address_same_as_billing: addresses.same_shipping_as_billing,
                    ..OrderUpdate::default()
                },
            )
            .await
            .map_err(FixtureError::at(BuildStep::AttachBillingAddress))?;

        let shipping = match addresses.separate_shipping() {
            Some(input) => {
                let address = self
                    .client
                    .create_address(input)
                    .await
                    .map_err(FixtureError::at(BuildStep::CreateShippingAddress))?;

                self.client
                    .update_order(
                        order_id,
                        &OrderUpdate {
                            shipping_address: Some(address.id.clone()),
                            ..OrderUpdate::default()
                        },
                    )
                    .await
                    .map_err(FixtureError::at(BuildStep::AttachShippingAddress))?;

                Some(address.id)
            }
            None => None,
        };

        Ok(Some(AttachedAddresses {
            billing: billing.id,
            shipping,
        }))
    }
}
