//! Tiered commerce client handles.
//!
//! Every fixture build works through two handles:
//!
//! - [`StandardClient`] - sales-channel credentials; assembles the order.
//! - [`ElevatedClient`] - integration credentials; only the privileged
//!   operations the build needs (gift card activation, order cleanup).
//!
//! The split is enforced by the types: a builder holding a `StandardClient`
//! has no way to call `activate_gift_card`.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::sync::RwLock;
use tracing::instrument;

use checkout_fixtures_core::{AddressInput, GiftCardId, OrderAttributes, OrderId};

use crate::commerce::auth::{self, AccessToken, CredentialTier};
use crate::commerce::{
    Address, CommerceApi, CommerceClient, CommerceError, GiftCard, GiftCardAction, GiftCardCreate,
    LineItem, LineItemCreate, Order, OrderUpdate, Sku, SkuQuery,
};
use crate::config::CommerceConfig;

/// Standard-tier handle.
#[derive(Clone)]
pub struct StandardClient {
    api: Arc<dyn CommerceApi>,
    token: SecretString,
}

impl StandardClient {
    pub fn new(api: Arc<dyn CommerceApi>, token: SecretString) -> Self {
        Self { api, token }
    }

    /// The access token this handle was issued, for handing to the checkout.
    #[must_use]
    pub const fn access_token(&self) -> &SecretString {
        &self.token
    }

    /// # Errors
    ///
    /// Propagates the backend error.
    pub async fn create_order(&self, attributes: &OrderAttributes) -> Result<Order, CommerceError> {
        self.api.create_order(attributes).await
    }

    /// # Errors
    ///
    /// Propagates the backend error.
    pub async fn update_order(
        &self,
        id: &OrderId,
        update: &OrderUpdate,
    ) -> Result<Order, CommerceError> {
        self.api.update_order(id, update).await
    }

    /// # Errors
    ///
    /// Propagates the backend error.
    pub async fn create_line_item(&self, input: &LineItemCreate) -> Result<LineItem, CommerceError> {
        self.api.create_line_item(input).await
    }

    /// # Errors
    ///
    /// Propagates the backend error.
    pub async fn create_address(&self, input: &AddressInput) -> Result<Address, CommerceError> {
        self.api.create_address(input).await
    }

    /// # Errors
    ///
    /// Propagates the backend error.
    pub async fn create_gift_card(&self, input: &GiftCardCreate) -> Result<GiftCard, CommerceError> {
        self.api.create_gift_card(input).await
    }

    /// Mark a gift card as purchased.
    ///
    /// # Errors
    ///
    /// Propagates the backend error.
    pub async fn purchase_gift_card(&self, id: &GiftCardId) -> Result<GiftCard, CommerceError> {
        self.api.update_gift_card(id, GiftCardAction::Purchase).await
    }

    /// # Errors
    ///
    /// Propagates the backend error.
    pub async fn list_skus(&self, query: &SkuQuery) -> Result<Vec<Sku>, CommerceError> {
        self.api.list_skus(query).await
    }
}

impl std::fmt::Debug for StandardClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandardClient")
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Elevated-tier handle. Exposes only the privileged calls.
#[derive(Clone)]
pub struct ElevatedClient {
    api: Arc<dyn CommerceApi>,
}

impl ElevatedClient {
    pub fn new(api: Arc<dyn CommerceApi>) -> Self {
        Self { api }
    }

    /// Make a purchased gift card redeemable.
    ///
    /// # Errors
    ///
    /// Propagates the backend error.
    pub async fn activate_gift_card(&self, id: &GiftCardId) -> Result<GiftCard, CommerceError> {
        self.api.update_gift_card(id, GiftCardAction::Activate).await
    }

    /// Delete an order.
    ///
    /// # Errors
    ///
    /// Propagates the backend error.
    pub async fn delete_order(&self, id: &OrderId) -> Result<(), CommerceError> {
        self.api.delete_order(id).await
    }
}

impl std::fmt::Debug for ElevatedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevatedClient").finish_non_exhaustive()
    }
}

/// Source of tiered client handles.
///
/// The elevated handle is requested lazily, so builds that never activate a
/// gift card never acquire integration credentials.
#[async_trait]
pub trait ClientSource: Send + Sync {
    /// A handle under standard credentials.
    async fn standard(&self) -> Result<StandardClient, CommerceError>;

    /// A handle under elevated credentials.
    async fn elevated(&self) -> Result<ElevatedClient, CommerceError>;
}

/// Issues [`StandardClient`] / [`ElevatedClient`] handles from configured
/// credentials, caching each tier's token until it nears expiry.
pub struct ClientProvider {
    http: reqwest::Client,
    config: CommerceConfig,
    standard_token: RwLock<Option<AccessToken>>,
    elevated_token: RwLock<Option<AccessToken>>,
}

impl ClientProvider {
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: CommerceConfig) -> Result<Self, CommerceError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            config,
            standard_token: RwLock::new(None),
            elevated_token: RwLock::new(None),
        })
    }

    const fn slot(&self, tier: CredentialTier) -> &RwLock<Option<AccessToken>> {
        match tier {
            CredentialTier::Standard => &self.standard_token,
            CredentialTier::Elevated => &self.elevated_token,
        }
    }

    /// A valid token for `tier`, from cache or freshly issued.
    #[instrument(skip(self), fields(tier = %tier))]
    async fn token(&self, tier: CredentialTier) -> Result<AccessToken, CommerceError> {
        let slot = self.slot(tier);

        if let Some(token) = slot.read().await.as_ref().filter(|t| !t.is_expired()) {
            return Ok(token.clone());
        }

        let mut guard = slot.write().await;
        // Another task may have refreshed while we waited for the lock
        if let Some(token) = guard.as_ref().filter(|t| !t.is_expired()) {
            return Ok(token.clone());
        }

        let token = match tier {
            CredentialTier::Standard => {
                auth::sales_channel_token(
                    &self.http,
                    &self.config.endpoint,
                    &self.config.sales_channel_client_id,
                    &self.config.scope,
                )
                .await?
            }
            CredentialTier::Elevated => {
                auth::integration_token(
                    &self.http,
                    &self.config.endpoint,
                    &self.config.integration_client_id,
                    &self.config.integration_client_secret,
                    &self.config.scope,
                )
                .await?
            }
        };

        tracing::info!(expires_at = token.expires_at, "Access token acquired");
        *guard = Some(token.clone());
        Ok(token)
    }

    fn client(&self, token: &AccessToken) -> Result<Arc<dyn CommerceApi>, CommerceError> {
        let client = CommerceClient::new(
            &self.config.endpoint,
            &token.token,
            self.config.request_timeout,
        )?;
        Ok(Arc::new(client))
    }
}

#[async_trait]
impl ClientSource for ClientProvider {
    async fn standard(&self) -> Result<StandardClient, CommerceError> {
        let token = self.token(CredentialTier::Standard).await?;
        Ok(StandardClient::new(self.client(&token)?, token.token))
    }

    async fn elevated(&self) -> Result<ElevatedClient, CommerceError> {
        let token = self.token(CredentialTier::Elevated).await?;
        Ok(ElevatedClient::new(self.client(&token)?))
    }
}

impl std::fmt::Debug for ClientProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientProvider")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
