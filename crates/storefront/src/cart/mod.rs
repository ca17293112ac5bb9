//! Client-held shopping cart.
//!
//! [`CartStore`] is the single owner of the cart's line items. Lines are
//! keyed by `(product id, color, size)`; adding an existing key merges by
//! summing quantities. Totals are derived from the lines on every read and
//! are never stored.
//!
//! Every mutation writes the full line list to a [`CartStorage`] slot. The
//! write is fire-and-forget: a failure is logged and the in-memory cart stays
//! authoritative. On open, the slot is read once; a missing or malformed slot
//! yields an empty cart.
//!
//! [`CartHandle`] shares one store between the views and the deferred clear
//! scheduled by checkout.

pub mod storage;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, warn};

use crib_core::{CartItem, LineKey, Price, Product, ProductId, Quantity, VariantOption};

pub use storage::{CART_STORAGE_KEY, CartStorage, FileStorage, MemoryStorage, StorageError};

/// Derived cart totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CartTotals {
    /// Sum of quantities over all lines.
    pub total_items: u64,
    /// Sum of price times quantity over all lines.
    pub total_price: Price,
}

impl CartTotals {
    /// Compute totals for a list of lines.
    #[must_use]
    pub fn of(items: &[CartItem]) -> Self {
        Self {
            total_items: items.iter().map(|i| u64::from(i.quantity().get())).sum(),
            total_price: items.iter().map(CartItem::line_total).sum(),
        }
    }
}

/// An immutable copy of the cart's lines and totals at one moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
    pub totals: CartTotals,
}

impl CartSnapshot {
    #[must_use]
    pub fn new(items: Vec<CartItem>) -> Self {
        let totals = CartTotals::of(&items);
        Self { items, totals }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Cart Store
// =============================================================================

/// The canonical cart.
pub struct CartStore {
    items: Vec<CartItem>,
    storage: Box<dyn CartStorage>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Open the cart, hydrating it from `storage`.
    ///
    /// A missing slot gives an empty cart. An unreadable or malformed slot
    /// also gives an empty cart, with a warning logged. Duplicate line keys
    /// in stored data are merged.
    #[must_use]
    pub fn open(storage: impl CartStorage + 'static) -> Self {
        let items = match storage.read(CART_STORAGE_KEY) {
            Ok(Some(payload)) => match serde_json::from_str::<Vec<CartItem>>(&payload) {
                Ok(items) => merge_duplicate_lines(items),
                Err(e) => {
                    warn!(error = %e, "Stored cart is malformed, starting with an empty cart");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read stored cart, starting with an empty cart");
                Vec::new()
            }
        };

        debug!(lines = items.len(), "Cart hydrated");

        Self {
            items,
            storage: Box::new(storage),
        }
    }

    /// Current lines, in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.items.len()
    }

    /// Totals derived from the current lines.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        CartTotals::of(&self.items)
    }

    /// Copy of the current lines and totals.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot::new(self.items.clone())
    }

    /// Add `quantity` of `product` in the given colour and size.
    ///
    /// An existing line with the same `(id, color, size)` has its quantity
    /// increased; otherwise a new line is appended.
    pub fn add_item(
        &mut self,
        product: &Product,
        quantity: Quantity,
        color: VariantOption,
        size: VariantOption,
    ) {
        let key = LineKey::new(product.id(), color, size);

        if let Some(line) = self.items.iter_mut().find(|item| item.matches(&key)) {
            line.add_quantity(quantity);
            debug!(line = %key, quantity = %line.quantity(), "Merged into existing cart line");
        } else {
            debug!(line = %key, %quantity, "Added cart line");
            let item = CartItem::new(product.clone(), quantity, key.color, key.size);
            self.items.push(item);
        }

        self.persist();
    }

    /// Remove every line for product `id`, whatever its colour or size.
    ///
    /// Returns the number of lines removed; an unknown id removes nothing.
    pub fn remove_item(&mut self, id: ProductId) -> usize {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        let removed = before - self.items.len();

        debug!(product_id = %id, removed, "Removed cart lines by product");
        self.persist();
        removed
    }

    /// Remove the single line with the given identity.
    ///
    /// Returns whether a line was removed.
    pub fn remove_line(&mut self, key: &LineKey) -> bool {
        let before = self.items.len();
        self.items.retain(|item| !item.matches(key));
        let removed = before != self.items.len();

        debug!(line = %key, removed, "Removed cart line");
        self.persist();
        removed
    }

    /// Set the quantity of every line for product `id` to `max(1, requested)`.
    ///
    /// Returns the number of lines updated; an unknown id updates nothing.
    pub fn update_quantity(&mut self, id: ProductId, requested: i64) -> usize {
        let quantity = Quantity::clamped(requested);
        let mut updated = 0;
        for item in self.items.iter_mut().filter(|item| item.id() == id) {
            item.set_quantity(quantity);
            updated += 1;
        }

        debug!(product_id = %id, requested, %quantity, updated, "Updated cart quantity");
        self.persist();
        updated
    }

    /// Set the quantity of the line with the given identity to
    /// `max(1, requested)`.
    ///
    /// Returns whether a line was updated.
    pub fn update_line_quantity(&mut self, key: &LineKey, requested: i64) -> bool {
        let quantity = Quantity::clamped(requested);
        let line = self.items.iter_mut().find(|item| item.matches(key));
        let updated = line.is_some();
        if let Some(line) = line {
            line.set_quantity(quantity);
        }

        debug!(line = %key, requested, %quantity, updated, "Updated cart line quantity");
        self.persist();
        updated
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        let lines = self.items.len();
        self.items.clear();

        debug!(lines, "Cleared cart");
        self.persist();
    }

    /// Write the full line list to storage, logging on failure.
    fn persist(&mut self) {
        let payload = match serde_json::to_string(&self.items) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Failed to serialize cart");
                return;
            }
        };

        if let Err(e) = self.storage.write(CART_STORAGE_KEY, &payload) {
            warn!(error = %e, "Failed to persist cart");
        }
    }
}

/// Collapse lines sharing a key, summing quantities, keeping first-seen order.
fn merge_duplicate_lines(items: Vec<CartItem>) -> Vec<CartItem> {
    let mut merged: Vec<CartItem> = Vec::with_capacity(items.len());
    for item in items {
        let key = item.key();
        if let Some(existing) = merged.iter_mut().find(|m| m.matches(&key)) {
            warn!(line = %key, "Stored cart had a duplicate line, merging");
            existing.add_quantity(item.quantity());
        } else {
            merged.push(item);
        }
    }
    merged
}

// =============================================================================
// Shared Handle
// =============================================================================

/// Cloneable handle to one [`CartStore`].
///
/// All views and the checkout's deferred clear go through the same handle.
/// A poisoned lock is recovered rather than propagated: every mutation leaves
/// the line list in a valid state, so the data behind a panicked holder is
/// still consistent.
#[derive(Debug, Clone)]
pub struct CartHandle {
    inner: Arc<Mutex<CartStore>>,
}

impl CartHandle {
    #[must_use]
    pub fn new(store: CartStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Lock the store for a sequence of reads or mutations.
    pub fn lock(&self) -> MutexGuard<'_, CartStore> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access to the store.
    pub fn with<R>(&self, f: impl FnOnce(&mut CartStore) -> R) -> R {
        f(&mut self.lock())
    }

    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        self.lock().snapshot()
    }

    #[must_use]
    pub fn totals(&self) -> CartTotals {
        self.lock().totals()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}
