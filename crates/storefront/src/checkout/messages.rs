//! Order summary and confirmation text.
//!
//! Composition is a pure function of the draft and brand: the same inputs
//! always produce byte-identical text, which is what lets the automatic
//! handoff and the manual copy fallback share it.

use std::fmt::Write;

use crate::cart::CartSnapshot;

use super::draft::OrderDraft;

/// Both messages for one draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffMessages {
    /// Sent to the merchant in step 1.
    pub order_summary: String,
    /// Sent to the customer in step 2.
    pub confirmation: String,
}

impl HandoffMessages {
    #[must_use]
    pub fn compose(draft: &OrderDraft, brand: &str) -> Self {
        Self {
            order_summary: order_summary(draft, brand),
            confirmation: confirmation(draft, brand),
        }
    }
}

/// Merchant-facing order summary.
#[must_use]
pub fn order_summary(draft: &OrderDraft, brand: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "*New Order from {brand} Website*\n");
    let _ = writeln!(out, "*Customer:* {}", draft.customer_name);
    let _ = writeln!(out, "*Customer Phone:* {}\n", draft.contact);
    out.push_str("*Order Details:*\n");
    push_line_items(&mut out, &draft.snapshot);
    push_totals(&mut out, &draft.snapshot);
    let _ = write!(out, "Thank you for shopping with {brand}!");
    out
}

/// Customer-facing confirmation.
#[must_use]
pub fn confirmation(draft: &OrderDraft, brand: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "*Thank you for your {brand} order!*\n");
    let _ = writeln!(out, "Hello {},\n", draft.customer_name);
    out.push_str(
        "We've received your order and will process it shortly. \
         Here's a summary of your purchase:\n\n",
    );
    push_line_items(&mut out, &draft.snapshot);
    push_totals(&mut out, &draft.snapshot);
    out.push_str("If you have any questions about your order, please contact us.\n\n");
    let _ = write!(out, "Thank you for shopping with {brand}!");
    out
}

fn push_line_items(out: &mut String, snapshot: &CartSnapshot) {
    for (index, item) in snapshot.items.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", index + 1, item.name());
        let _ = writeln!(out, "   - Quantity: {}", item.quantity());
        let _ = writeln!(out, "   - Size: {}", item.size());
        let _ = writeln!(out, "   - Color: {}", item.color());
        let _ = writeln!(out, "   - Price: {}\n", item.line_total().display());
    }
}

fn push_totals(out: &mut String, snapshot: &CartSnapshot) {
    let totals = &snapshot.totals;
    let _ = writeln!(out, "*Total Items:* {}", totals.total_items);
    let _ = writeln!(out, "*Total Price:* {}\n", totals.total_price.display());
}
