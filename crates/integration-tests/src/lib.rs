//! Live-backend tests for checkout order fixtures.
//!
//! # Running Tests
//!
//! ```bash
//! # Credentials for a test organization in .env.local
//! cargo test -p checkout-fixtures-integration-tests -- --ignored
//! ```
//!
//! Every test builds real orders. Orders are left in place; point the
//! credentials at a sandbox organization.

#![cfg_attr(not(test), forbid(unsafe_code))]

use checkout_fixtures::{
    CheckoutFixture, FixtureConfig, FixtureError, FixtureProvider, LinkPage,
};
use checkout_fixtures_core::FixtureParams;
use uuid::Uuid;

/// Provider and configuration loaded from the environment.
#[derive(Debug)]
pub struct TestContext {
    pub config: FixtureConfig,
    pub provider: FixtureProvider,
}

impl TestContext {
    /// Load credentials from `.env.local` / `.env` and the process environment.
    ///
    /// # Errors
    ///
    /// Returns error if configuration is missing or the HTTP client fails to build.
    pub fn from_env() -> Result<Self, FixtureError> {
        let config = FixtureConfig::from_env()?;
        let provider = FixtureProvider::from_config(&config)?;
        Ok(Self { config, provider })
    }

    /// Build a fixture whose page records the checkout link.
    ///
    /// # Errors
    ///
    /// Returns any error from [`FixtureProvider::checkout`].
    pub async fn checkout(
        &self,
        params: FixtureParams,
    ) -> Result<CheckoutFixture<LinkPage>, FixtureError> {
        let base_url = self.config.checkout_base_url.clone();
        self.provider
            .checkout(params, |attributes| LinkPage::new(base_url, attributes))
            .await
    }
}

/// A customer email no other test run will reuse.
#[must_use]
pub fn unique_email() -> String {
    format!("fixture-{}@example.com", Uuid::new_v4().simple())
}
