//! Core types for checkout fixtures.
//!
//! This module provides type-safe wrappers for resource identifiers and the
//! codes the commerce backend accepts.

pub mod currency;
pub mod id;

pub use currency::{CountryCode, CurrencyCode, LanguageCode};
pub use id::*;
