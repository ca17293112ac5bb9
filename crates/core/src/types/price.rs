//! Type-safe price representation in the smallest currency unit.
//!
//! Prices are whole naira amounts as listed in the catalog. The stored cart
//! record keeps the bare integer (`"price": 25000`), so `Price` serializes
//! transparently.

use core::fmt;
use core::iter::Sum;

use serde::{Deserialize, Serialize};

use super::quantity::Quantity;

/// Naira sign used when rendering prices.
const CURRENCY_SYMBOL: &str = "₦";

/// A non-negative price in the smallest currency unit.
///
/// Arithmetic saturates at `u64::MAX` instead of wrapping, so totals can
/// never silently roll over to a small number.
///
/// ```
/// use crib_core::{Price, Quantity};
///
/// let unit = Price::new(25_000);
/// let line = unit.times(Quantity::clamped(3));
/// assert_eq!(line.display(), "₦75,000");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(0);

    /// Create a new price from an amount in the smallest currency unit.
    #[must_use]
    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    /// Get the underlying amount.
    #[must_use]
    pub const fn amount(&self) -> u64 {
        self.0
    }

    /// Price of `quantity` units at this unit price.
    #[must_use]
    pub fn times(self, quantity: Quantity) -> Self {
        Self(self.0.saturating_mul(u64::from(quantity.get())))
    }

    /// Add two prices, saturating at the maximum representable amount.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Format for display with thousands separators (e.g., "₦25,000").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{CURRENCY_SYMBOL}{}", group_thousands(self.0))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<u64> for Price {
    fn from(amount: u64) -> Self {
        Self(amount)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

/// Insert a comma between every group of three digits.
fn group_thousands(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
