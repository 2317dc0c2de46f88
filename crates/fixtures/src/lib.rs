//! Checkout fixtures - order composition engine.
//!
//! Builds fully-populated commerce orders on demand for end-to-end checkout
//! tests, then hands the test a page that has navigated to the order.
//!
//! # Layers
//!
//! - [`commerce`] - JSON:API client and token acquisition
//! - [`clients`] - Standard / elevated client handles
//! - [`builders`] - Gift card, line item and address builders
//! - [`composer`] - Variant dispatch over an [`OrderSpec`](checkout_fixtures_core::OrderSpec)
//! - [`fixture`] - Per-test fixture provider and page abstraction
//!
//! # Security
//!
//! The elevated tier uses integration credentials that can activate gift
//! cards and delete orders. Point it at a test organization only.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod builders;
pub mod clients;
pub mod commerce;
pub mod composer;
pub mod config;
pub mod error;
pub mod fixture;

#[cfg(test)]
mod testing;

pub use clients::{ClientProvider, ClientSource, ElevatedClient, StandardClient};
pub use composer::{ComposeOptions, OrderComposer};
pub use config::{ConfigError, FixtureConfig};
pub use error::{BuildStep, FixtureError};
pub use fixture::{
    CheckoutFixture, CheckoutPage, CheckoutTarget, FixtureProvider, LinkPage, PageAttributes,
};
