//! Commerce backend API client.
//!
//! Provides the resource operations the fixtures need against the commerce
//! backend's JSON:API: create/update orders, line items, addresses and gift
//! cards, and list SKUs.
//!
//! # Architecture
//!
//! - [`CommerceApi`] is the capability seam. [`CommerceClient`] implements it
//!   over HTTP; unit tests substitute an in-memory backend.
//! - Access tokens come from [`auth`] (OAuth client credentials). A client is
//!   bound to exactly one token for its whole life.
//! - No retries: a failed call surfaces as a [`CommerceError`] and the caller
//!   decides whether it is fatal.
//!
//! # API Reference
//!
//! - Base URL: `{endpoint}/api`
//! - Authentication: `Authorization: Bearer <access token>`
//! - Media type: `application/vnd.api+json`

pub mod auth;
pub mod client;
pub mod types;

pub use auth::{AccessToken, CredentialTier};
pub use client::CommerceClient;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

use checkout_fixtures_core::{AddressInput, GiftCardId, OrderAttributes, OrderId};

/// Errors that can occur when interacting with the commerce API.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// HTTP request failed (connect, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The access token was rejected.
    #[error("Unauthorized: invalid or expired access token")]
    Unauthorized,

    /// The token is valid but its tier may not perform the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Token acquisition failed.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Failed to encode a request or decode a response.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl CommerceError {
    /// HTTP status associated with this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::RateLimited(_) => Some(429),
            Self::NotFound(_) => Some(404),
            Self::Unauthorized => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::AuthenticationFailed(_) | Self::Parse(_) => None,
        }
    }
}

/// Resource operations against the commerce backend.
///
/// One implementation is bound to one access token. Whether an operation is
/// permitted depends on that token's tier; see
/// [`crate::clients::StandardClient`] and [`crate::clients::ElevatedClient`]
/// for the split the fixtures rely on.
#[async_trait]
pub trait CommerceApi: Send + Sync {
    /// Create an order with the given attributes.
    async fn create_order(&self, attributes: &OrderAttributes) -> Result<Order, CommerceError>;

    /// Apply a blind update to an order.
    async fn update_order(&self, id: &OrderId, update: &OrderUpdate)
    -> Result<Order, CommerceError>;

    /// Delete an order.
    async fn delete_order(&self, id: &OrderId) -> Result<(), CommerceError>;

    /// Create a line item on an order.
    async fn create_line_item(&self, input: &LineItemCreate) -> Result<LineItem, CommerceError>;

    /// Create a standalone address.
    async fn create_address(&self, input: &AddressInput) -> Result<Address, CommerceError>;

    /// Create a gift card.
    async fn create_gift_card(&self, input: &GiftCardCreate) -> Result<GiftCard, CommerceError>;

    /// Move a gift card through a lifecycle transition.
    async fn update_gift_card(
        &self,
        id: &GiftCardId,
        action: GiftCardAction,
    ) -> Result<GiftCard, CommerceError>;

    /// List catalog SKUs.
    async fn list_skus(&self, query: &SkuQuery) -> Result<Vec<Sku>, CommerceError>;
}
