//! Unified error handling with Sentry integration.
//!
//! [`StorefrontError`] wraps the per-concern errors of the library so that a
//! front end can return one type and report it in one place.

use thiserror::Error;

use crib_core::{OptionError, ProductError, ProductId};

use crate::checkout::CheckoutError;
use crate::config::ConfigError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Checkout step rejected.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Product record is invalid.
    #[error("Invalid product: {0}")]
    Product(#[from] ProductError),

    /// Colour or size is invalid.
    #[error("Invalid option: {0}")]
    Option(#[from] OptionError),

    /// No catalog product has this id.
    #[error("Unknown product: {0}")]
    UnknownProduct(ProductId),

    /// The cart has no line matching the request.
    #[error("Not in cart: {0}")]
    NotInCart(String),
}

impl StorefrontError {
    /// Whether this error was caused by user input rather than the
    /// environment.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Checkout(CheckoutError::Validation(_))
                | Self::Option(_)
                | Self::UnknownProduct(_)
                | Self::NotInCart(_)
        )
    }

    /// Log the error and, for environment failures, capture it to Sentry.
    pub fn report(&self) {
        if self.is_user_error() {
            tracing::warn!(error = %self, "Request rejected");
        } else {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::{CheckoutStage, ValidationError};

    #[test]
    fn test_storefront_error_display() {
        let err = StorefrontError::UnknownProduct(ProductId::new(42));
        assert_eq!(err.to_string(), "Unknown product: 42");

        let err = StorefrontError::from(CheckoutError::InvalidTransition {
            action: "send the confirmation",
            stage: CheckoutStage::OrderPending,
        });
        assert_eq!(
            err.to_string(),
            "Checkout error: cannot send the confirmation while checkout is order_pending"
        );
    }

    #[test]
    fn test_user_errors() {
        let empty = CheckoutError::Validation(ValidationError::EmptyCart);
        assert!(StorefrontError::from(empty).is_user_error());

        let unknown = StorefrontError::UnknownProduct(ProductId::new(9));
        assert!(unknown.is_user_error());

        let config = ConfigError::InvalidEnvVar("CRIB_BRAND".into(), "bad".into());
        assert!(!StorefrontError::from(config).is_user_error());
    }

    #[test]
    fn test_breadcrumb_without_client_is_noop() {
        let data = [("draft", "abc")];
        add_breadcrumb("checkout", "Order sent to merchant", Some(&data));
    }
}
