//! Manual recovery when a chat cannot be opened automatically.

use thiserror::Error;

/// Errors from a clipboard backend.
#[derive(Debug, Error)]
pub enum ClipboardError {
    /// No clipboard is reachable from this environment.
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
}

/// Copy-to-clipboard side effect.
pub trait Clipboard {
    /// Place `text` on the clipboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the clipboard cannot be written.
    fn copy(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Which message the fallback actions currently act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackTarget {
    /// The order summary, addressed to the merchant.
    Merchant,
    /// The confirmation, addressed to the customer.
    Customer,
}
