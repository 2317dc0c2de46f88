//! Checkout Fixtures Core - Shared types library.
//!
//! This crate provides the types shared by every checkout fixtures component:
//! - `fixtures` - The order composition engine and fixture provider
//! - `cli` - Command-line order builder
//! - `integration-tests` - Live-backend scenarios
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no HTTP
//! clients. Test suites can depend on it to describe orders without pulling
//! in the engine.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for resource IDs and backend codes
//! - [`spec`] - Order specifications, from flat fixture params to the closed
//!   [`OrderShape`] sum type
//! - [`result`] - Build results and the line item / cleanup policies

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod result;
pub mod spec;
pub mod types;

pub use result::*;
pub use spec::*;
pub use types::*;
