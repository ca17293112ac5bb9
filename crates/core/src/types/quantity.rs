//! Line-item quantity that can never be zero.

use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Quantity of a cart line.
///
/// Backed by [`NonZeroU32`], so a quantity below one cannot be represented.
/// Deserializing `0` fails, which makes a stored cart holding a zero-quantity
/// line malformed rather than silently accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A quantity of one.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity, returning `None` for zero.
    #[must_use]
    pub const fn new(value: u32) -> Option<Self> {
        match NonZeroU32::new(value) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Create a quantity from any requested value, clamping to `1..=u32::MAX`.
    ///
    /// Zero and negative requests become one.
    #[must_use]
    pub fn clamped(requested: i64) -> Self {
        let value = u32::try_from(requested.max(1)).unwrap_or(u32::MAX);
        Self::new(value).unwrap_or(Self::ONE)
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Add two quantities, saturating at `u32::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0.get()))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Quantity {
    type Error = ZeroQuantity;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(ZeroQuantity)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}

/// Error returned when a zero quantity is requested.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("quantity must be at least 1")]
pub struct ZeroQuantity;
