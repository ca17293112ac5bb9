//! Ephemeral order draft captured when checkout starts.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crib_core::PhoneNumber;

use crate::cart::CartSnapshot;

/// Customer details plus a snapshot of the cart.
///
/// Lives only for the duration of one checkout flow and is never written to
/// storage. `id` and `created_at` exist for log correlation; they do not
/// appear in composed messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub customer_name: String,
    pub contact: PhoneNumber,
    pub snapshot: CartSnapshot,
}

impl OrderDraft {
    /// Capture a new draft. `customer_name` is trimmed.
    #[must_use]
    pub fn new(customer_name: &str, contact: PhoneNumber, snapshot: CartSnapshot) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            customer_name: customer_name.trim().to_owned(),
            contact,
            snapshot,
        }
    }
}
