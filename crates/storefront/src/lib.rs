//! CRIB storefront library.
//!
//! Cart store with a durable storage slot, the two-step WhatsApp checkout
//! handoff, the built-in catalog, and the configuration and state shared by
//! front ends.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod notice;
pub mod state;
