//! Integration tests for CRIB.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p crib-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - Cart store against file-backed storage
//! - `checkout_flow` - Two-step handoff end to end with scripted channels
//!
//! This crate also provides the shared fixtures used by those tests.

use std::path::Path;

use crib_core::{ProductId, Quantity, VariantOption};
use crib_storefront::checkout::{
    ChannelOutcome, ChannelRequest, Clipboard, ClipboardError, MessageChannel,
};
use crib_storefront::config::StorefrontConfig;
use crib_storefront::state::AppState;

/// Storefront state whose cart lives in `dir`.
#[must_use]
pub fn state_in(dir: &Path) -> AppState {
    AppState::open(StorefrontConfig {
        storage_dir: dir.to_path_buf(),
        ..StorefrontConfig::default()
    })
}

/// Add a catalog product to the cart in the given colour and size.
///
/// # Panics
///
/// Panics if the product is not in the built-in catalog or an option is
/// blank.
#[allow(clippy::unwrap_used)]
pub fn add(state: &AppState, id: i32, quantity: u32, color: &str, size: &str) {
    let entry = state.catalog().find(ProductId::new(id)).unwrap();
    state.cart().with(|cart| {
        cart.add_item(
            &entry.product,
            Quantity::new(quantity).unwrap(),
            VariantOption::parse(color).unwrap(),
            VariantOption::parse(size).unwrap(),
        );
    });
}

/// Channel double that fails a scripted number of times, then opens.
#[derive(Debug, Default)]
pub struct ScriptedChannel {
    /// Opens to refuse before succeeding.
    pub failures_remaining: usize,
    /// Every request received, in order.
    pub requests: Vec<ChannelRequest>,
}

impl ScriptedChannel {
    #[must_use]
    pub fn failing(times: usize) -> Self {
        Self {
            failures_remaining: times,
            requests: Vec::new(),
        }
    }
}

impl MessageChannel for ScriptedChannel {
    fn open(&mut self, request: &ChannelRequest) -> ChannelOutcome {
        self.requests.push(request.clone());
        if self.failures_remaining > 0 {
            self.failures_remaining -= 1;
            ChannelOutcome::Unavailable {
                reason: "window blocked".to_string(),
            }
        } else {
            ChannelOutcome::Opened
        }
    }
}

/// Clipboard double recording everything copied.
#[derive(Debug, Default)]
pub struct RecordingClipboard {
    pub copied: Vec<String>,
}

impl Clipboard for RecordingClipboard {
    fn copy(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.copied.push(text.to_owned());
        Ok(())
    }
}
