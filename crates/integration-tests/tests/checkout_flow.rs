//! End-to-end checkout handoff tests.
//!
//! These run the full two-step flow over file-backed storage with scripted
//! channels, so no chat is actually opened.

use std::time::Duration;

use crib_integration_tests::{RecordingClipboard, ScriptedChannel, add, state_in};
use crib_storefront::checkout::{CheckoutError, CheckoutStage, ValidationError};
use crib_storefront::notice::Notice;

const NAME: &str = "Ada";
const PHONE: &str = "08012345678";

// =============================================================================
// Happy Path
// =============================================================================

#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn test_both_steps_clear_cart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(dir.path());
    add(&state, 1, 2, "Stealth Black", "M");

    let cart = state.cart();
    let mut flow = state.checkout();
    let mut channel = ScriptedChannel::default();
    let mut notices: Vec<Notice> = Vec::new();

    flow.begin(NAME, PHONE, cart, &mut notices).unwrap();
    flow.send_order(&mut channel, &mut notices).unwrap();
    flow.send_confirmation(&mut channel, cart, &mut notices)
        .unwrap();
    assert_eq!(flow.stage(), CheckoutStage::ConfirmationSent);

    let addresses: Vec<&str> = channel
        .requests
        .iter()
        .map(|r| r.address.as_str())
        .collect();
    assert_eq!(addresses, vec!["2349078048405", "2348012345678"]);

    // Still on disk until the delay elapses.
    assert!(!state_in(dir.path()).cart().snapshot().is_empty());

    assert!(flow.take_pending_clear().unwrap().finished().await);
    assert!(cart.snapshot().is_empty());
    assert!(state_in(dir.path()).cart().snapshot().is_empty());
}

#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn test_messages_carry_jacket_totals() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(dir.path());
    add(&state, 1, 2, "Stealth Black", "M");
    add(&state, 1, 1, "Stealth Black", "M");

    let cart = state.cart();
    let mut flow = state.checkout();
    let mut channel = ScriptedChannel::default();
    let mut notices: Vec<Notice> = Vec::new();
    flow.begin(NAME, PHONE, cart, &mut notices).unwrap();
    flow.send_order(&mut channel, &mut notices).unwrap();

    let summary = &flow.messages().unwrap().order_summary;
    assert!(summary.contains("   - Quantity: 3\n"));
    assert!(summary.contains("*Total Items:* 3\n"));
    assert!(summary.contains("*Total Price:* ₦75,000\n"));
    assert!(summary.contains("*Customer Phone:* 08012345678\n"));
}

// =============================================================================
// Failure and Fallback
// =============================================================================

#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn test_step_one_failure_then_retry() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(dir.path());
    add(&state, 3, 1, "Ash", "L");
    let before = state.cart().snapshot();

    let cart = state.cart();
    let mut flow = state.checkout();
    let mut channel = ScriptedChannel::failing(1);
    let mut notices: Vec<Notice> = Vec::new();

    flow.begin(NAME, PHONE, cart, &mut notices).unwrap();
    let outcome = flow.send_order(&mut channel, &mut notices).unwrap();
    assert!(!outcome.is_opened());
    assert_eq!(flow.stage(), CheckoutStage::OrderPending);
    assert!(flow.fallback_shown());
    assert_eq!(state_in(dir.path()).cart().snapshot(), before);

    flow.send_order(&mut channel, &mut notices).unwrap();
    assert_eq!(flow.stage(), CheckoutStage::OrderSent);
    assert!(flow.fallback_shown());
}

#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn test_only_step_one_never_clears() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(dir.path());
    add(&state, 2, 1, "Obsidian", "M");

    let cart = state.cart();
    let mut flow = state.checkout();
    let mut channel = ScriptedChannel::default();
    let mut notices: Vec<Notice> = Vec::new();
    flow.begin(NAME, PHONE, cart, &mut notices).unwrap();
    flow.send_order(&mut channel, &mut notices).unwrap();

    channel.failures_remaining = 3;
    for _ in 0..3 {
        flow.send_confirmation(&mut channel, cart, &mut notices)
            .unwrap();
    }
    assert_eq!(flow.stage(), CheckoutStage::OrderSent);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(flow.pending_clear().is_none());
    assert!(!state_in(dir.path()).cart().snapshot().is_empty());
}

#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn test_copy_fallback_matches_channel_text() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(dir.path());
    add(&state, 5, 1, "Default", "M");

    let cart = state.cart();
    let mut flow = state.checkout();
    let mut channel = ScriptedChannel::failing(2);
    let mut clipboard = RecordingClipboard::default();
    let mut notices: Vec<Notice> = Vec::new();

    flow.begin(NAME, PHONE, cart, &mut notices).unwrap();
    flow.send_order(&mut channel, &mut notices).unwrap();
    flow.copy_message(&mut clipboard, &mut notices).unwrap();

    assert_eq!(
        clipboard.copied.first().map(String::as_str),
        channel.requests.first().and_then(|r| r.text.as_deref())
    );

    flow.send_order(&mut channel, &mut notices).unwrap();
    flow.send_order(&mut channel, &mut notices).unwrap();
    flow.send_confirmation(&mut channel, cart, &mut notices)
        .unwrap();
    assert_eq!(flow.stage(), CheckoutStage::ConfirmationSent);
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
#[allow(clippy::unwrap_used)]
fn test_confirmation_cannot_skip_order() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(dir.path());
    add(&state, 1, 1, "Cyber Blue", "M");

    let cart = state.cart();
    let mut flow = state.checkout();
    let mut channel = ScriptedChannel::default();
    let mut notices: Vec<Notice> = Vec::new();
    flow.begin(NAME, PHONE, cart, &mut notices).unwrap();

    let err = flow
        .send_confirmation(&mut channel, cart, &mut notices)
        .unwrap_err();
    assert!(matches!(err, CheckoutError::InvalidTransition { .. }));
    assert!(channel.requests.is_empty());
    assert_ne!(flow.stage(), CheckoutStage::ConfirmationSent);
}

#[test]
#[allow(clippy::unwrap_used)]
fn test_empty_cart_cannot_check_out() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(dir.path());

    let cart = state.cart();
    let mut flow = state.checkout();
    let mut notices: Vec<Notice> = Vec::new();
    let err = flow.begin(NAME, PHONE, cart, &mut notices).unwrap_err();

    assert_eq!(err, CheckoutError::Validation(ValidationError::EmptyCart));
    assert_eq!(flow.stage(), CheckoutStage::Idle);
    assert_eq!(notices.len(), 1);
}
