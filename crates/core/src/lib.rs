//! CRIB Core - Shared types library.
//!
//! This crate provides the value types used across all CRIB components:
//! - `storefront` - Cart store and WhatsApp checkout handoff
//! - `cli` - Command-line storefront for browsing, the cart, and checkout
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no
//! messaging. Every constraint a cart line relies on (non-empty options,
//! quantity of at least one, non-negative prices) is enforced here at
//! construction and deserialization time.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, quantities, phone numbers, and cart records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
