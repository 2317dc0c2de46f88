//! Builders for the sub-resources of an order.
//!
//! # Builders
//!
//! - `gift_card` - Create and purchase a gift card
//! - `line_items` - Attach SKU, bundle and gift card line items
//! - `address` - Create and link billing/shipping addresses
//!
//! All builders work through a [`StandardClient`](crate::clients::StandardClient);
//! privileged follow-ups (activation) are the composer's job.

pub mod address;
pub mod gift_card;
pub mod line_items;

pub use address::{AddressAttacher, AttachedAddresses};
pub use gift_card::GiftCardBuilder;
pub use line_items::LineItemBuilder;
