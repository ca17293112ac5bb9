//! Core types for CRIB.
//!
//! This module provides type-safe wrappers for the storefront's domain concepts.

pub mod id;
pub mod item;
pub mod phone;
pub mod price;
pub mod quantity;

pub use id::*;
pub use item::{CartItem, LineKey, OptionError, Product, ProductError, VariantOption};
pub use phone::{PhoneError, PhoneNumber};
pub use price::Price;
pub use quantity::{Quantity, ZeroQuantity};
