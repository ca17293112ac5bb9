//! Two-step WhatsApp checkout handoff.
//!
//! There is no payment or order backend. Checkout instead hands the order to
//! the merchant, then a confirmation to the customer, through a messaging
//! channel:
//!
//! ```text
//! Idle --begin--> OrderPending --send_order--> OrderSent --send_confirmation--> ConfirmationSent
//! ```
//!
//! - `begin` validates name, contact, and a non-empty cart, and captures an
//!   [`OrderDraft`]. Validation failures emit a notice and leave the stage
//!   unchanged.
//! - `send_order` composes both messages and opens the merchant chat.
//! - `send_confirmation` opens the customer chat and, on success, schedules
//!   the cart clear. This is the only path that clears the cart, and it is
//!   reachable only from `OrderSent`.
//!
//! A failed open sets the `fallback_shown` flag and leaves the stage where it
//! was. The fallback actions ([`CheckoutFlow::copy_message`],
//! [`CheckoutFlow::open_without_text`]) never advance the stage.

pub mod channel;
pub mod draft;
pub mod fallback;
pub mod messages;
pub mod schedule;

use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};
use url::Url;

use crib_core::PhoneNumber;

use crate::cart::CartHandle;
use crate::error::add_breadcrumb;
use crate::notice::{Notice, NoticeSink};

pub use channel::{ChannelOutcome, ChannelRequest, MessageChannel};
pub use draft::OrderDraft;
pub use fallback::{Clipboard, ClipboardError, FallbackTarget};
pub use messages::HandoffMessages;
pub use schedule::ScheduledClear;

/// Default merchant WhatsApp number.
pub const DEFAULT_MERCHANT_ADDRESS: &str = "2349078048405";

/// Default country calling code replacing a local trunk prefix.
pub const DEFAULT_COUNTRY_CODE: &str = "234";

/// Default brand name used in messages and notices.
pub const DEFAULT_BRAND: &str = "CRIB";

/// Default messaging channel base URL.
pub const DEFAULT_CHANNEL_BASE_URL: &str = "https://wa.me";

/// Default delay before the cart is cleared after a completed checkout.
pub const DEFAULT_CLEAR_DELAY: Duration = Duration::from_secs(2);

static DEFAULT_CHANNEL_BASE: LazyLock<Url> = LazyLock::new(|| {
    Url::parse(DEFAULT_CHANNEL_BASE_URL)
        .expect("default channel base URL is valid")
});

/// Settings for the handoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffConfig {
    /// Merchant chat address (international, digits only).
    pub merchant_address: String,
    /// Calling code replacing a leading trunk `0` in customer numbers.
    pub country_code: String,
    /// Brand name used in messages and notices.
    pub brand: String,
    /// Messaging channel base URL.
    pub channel_base: Url,
    /// Delay between confirmation and cart clear.
    pub clear_delay: Duration,
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            merchant_address: DEFAULT_MERCHANT_ADDRESS.to_owned(),
            country_code: DEFAULT_COUNTRY_CODE.to_owned(),
            brand: DEFAULT_BRAND.to_owned(),
            channel_base: DEFAULT_CHANNEL_BASE.clone(),
            clear_delay: DEFAULT_CLEAR_DELAY,
        }
    }
}

/// Position in the handoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStage {
    #[default]
    Idle,
    OrderPending,
    OrderSent,
    /// Terminal success.
    ConfirmationSent,
}

impl fmt::Display for CheckoutStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::OrderPending => write!(f, "order_pending"),
            Self::OrderSent => write!(f, "order_sent"),
            Self::ConfirmationSent => write!(f, "confirmation_sent"),
        }
    }
}

/// Customer input rejected by [`CheckoutFlow::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("customer name is required")]
    MissingName,
    #[error("customer phone number is required")]
    MissingContact,
    #[error("cart is empty")]
    EmptyCart,
}

/// Errors returned by checkout operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// Customer input was rejected; a notice has been emitted.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The operation is not allowed in the current stage.
    #[error("cannot {action} while checkout is {stage}")]
    InvalidTransition {
        action: &'static str,
        stage: CheckoutStage,
    },
}

// =============================================================================
// Checkout Flow
// =============================================================================

/// State machine driving one checkout.
#[derive(Debug)]
pub struct CheckoutFlow {
    config: HandoffConfig,
    stage: CheckoutStage,
    fallback_shown: bool,
    draft: Option<OrderDraft>,
    messages: Option<HandoffMessages>,
    pending_clear: Option<ScheduledClear>,
}

impl CheckoutFlow {
    #[must_use]
    pub const fn new(config: HandoffConfig) -> Self {
        Self {
            config,
            stage: CheckoutStage::Idle,
            fallback_shown: false,
            draft: None,
            messages: None,
            pending_clear: None,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &HandoffConfig {
        &self.config
    }

    #[must_use]
    pub const fn stage(&self) -> CheckoutStage {
        self.stage
    }

    /// Whether a failed open has exposed the manual fallback actions.
    #[must_use]
    pub const fn fallback_shown(&self) -> bool {
        self.fallback_shown
    }

    #[must_use]
    pub const fn draft(&self) -> Option<&OrderDraft> {
        self.draft.as_ref()
    }

    /// Messages composed by the last `send_order` attempt.
    #[must_use]
    pub const fn messages(&self) -> Option<&HandoffMessages> {
        self.messages.as_ref()
    }

    /// The cart clear scheduled by a completed checkout, if any.
    #[must_use]
    pub const fn pending_clear(&self) -> Option<&ScheduledClear> {
        self.pending_clear.as_ref()
    }

    /// Take ownership of the scheduled clear, e.g. to await it.
    pub const fn take_pending_clear(&mut self) -> Option<ScheduledClear> {
        self.pending_clear.take()
    }

    /// Normalized customer chat address for the current draft.
    #[must_use]
    pub fn customer_address(&self) -> Option<String> {
        self.draft
            .as_ref()
            .map(|d| d.contact.whatsapp_address(&self.config.country_code))
    }

    /// Which message the fallback actions act on right now.
    #[must_use]
    pub const fn fallback_target(&self) -> Option<FallbackTarget> {
        match self.stage {
            CheckoutStage::OrderPending => Some(FallbackTarget::Merchant),
            CheckoutStage::OrderSent => Some(FallbackTarget::Customer),
            CheckoutStage::Idle | CheckoutStage::ConfirmationSent => None,
        }
    }

    /// Submit customer details and capture a draft of the cart.
    ///
    /// Allowed from `Idle`, and from `OrderPending` to replace the draft
    /// before the order has been sent.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Validation`] (after emitting a notice) if the
    /// name or contact is blank or the cart is empty, and
    /// [`CheckoutError::InvalidTransition`] once the order has been sent.
    pub fn begin(
        &mut self,
        name: &str,
        contact: &str,
        cart: &CartHandle,
        notices: &mut dyn NoticeSink,
    ) -> Result<(), CheckoutError> {
        match self.stage {
            CheckoutStage::Idle | CheckoutStage::OrderPending => {}
            CheckoutStage::OrderSent | CheckoutStage::ConfirmationSent => {
                return Err(self.invalid("begin checkout"));
            }
        }

        if name.trim().is_empty() {
            notices.notify(Notice::destructive(
                "Name required",
                "Please enter your name to proceed",
            ));
            return Err(ValidationError::MissingName.into());
        }

        let Ok(contact) = PhoneNumber::parse(contact) else {
            notices.notify(Notice::destructive(
                "Phone number required",
                "Please enter your WhatsApp number to proceed",
            ));
            return Err(ValidationError::MissingContact.into());
        };

        let snapshot = cart.snapshot();
        if snapshot.is_empty() {
            notices.notify(Notice::destructive(
                "Your cart is empty",
                "Add something to your cart before checking out",
            ));
            return Err(ValidationError::EmptyCart.into());
        }

        let draft = OrderDraft::new(name, contact, snapshot);
        info!(
            draft_id = %draft.id,
            created_at = %draft.created_at,
            lines = draft.snapshot.items.len(),
            total_items = draft.snapshot.totals.total_items,
            total_price = draft.snapshot.totals.total_price.amount(),
            "Checkout started"
        );

        self.draft = Some(draft);
        self.messages = None;
        self.stage = CheckoutStage::OrderPending;
        Ok(())
    }

    /// Step 1: open the merchant chat with the order summary.
    ///
    /// On success the stage moves to `OrderSent`. If the chat cannot be
    /// opened the fallback is shown and the stage stays `OrderPending`, so
    /// the step can be retried.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidTransition`] unless the stage is
    /// `OrderPending`.
    #[instrument(skip_all, fields(draft_id = ?self.draft.as_ref().map(|d| d.id)))]
    pub fn send_order(
        &mut self,
        channel: &mut dyn MessageChannel,
        notices: &mut dyn NoticeSink,
    ) -> Result<ChannelOutcome, CheckoutError> {
        if self.stage != CheckoutStage::OrderPending {
            return Err(self.invalid("send the order"));
        }
        let Some(draft) = self.draft.as_ref() else {
            return Err(self.invalid("send the order"));
        };

        let messages = HandoffMessages::compose(draft, &self.config.brand);
        let request = ChannelRequest::new(
            &self.config.channel_base,
            &self.config.merchant_address,
            Some(&messages.order_summary),
        );
        self.messages = Some(messages);

        let outcome = channel.open(&request);
        match &outcome {
            ChannelOutcome::Opened => {
                self.stage = CheckoutStage::OrderSent;
                info!("Order handed off to merchant");
                add_breadcrumb("checkout", "Order sent to merchant", None);
                notices.notify(Notice::info(
                    format!("Order sent to {}", self.config.brand),
                    "Now let's send you a confirmation",
                ));
            }
            ChannelOutcome::Unavailable { reason } => {
                self.fallback_shown = true;
                warn!(%reason, "Failed to open merchant chat");
                notices.notify(Notice::destructive(
                    "Couldn't open WhatsApp",
                    "Please use the copy option below to send your order",
                ));
            }
        }
        Ok(outcome)
    }

    /// Step 2: open the customer chat with the confirmation.
    ///
    /// On success the stage moves to `ConfirmationSent` and the cart clear is
    /// scheduled after the configured delay. If the chat cannot be opened the
    /// fallback is shown and the stage stays `OrderSent`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidTransition`] unless the stage is
    /// `OrderSent`.
    #[instrument(skip_all, fields(draft_id = ?self.draft.as_ref().map(|d| d.id)))]
    pub fn send_confirmation(
        &mut self,
        channel: &mut dyn MessageChannel,
        cart: &CartHandle,
        notices: &mut dyn NoticeSink,
    ) -> Result<ChannelOutcome, CheckoutError> {
        if self.stage != CheckoutStage::OrderSent {
            return Err(self.invalid("send the confirmation"));
        }
        let (Some(address), Some(messages)) = (self.customer_address(), self.messages.as_ref())
        else {
            return Err(self.invalid("send the confirmation"));
        };

        let request = ChannelRequest::new(
            &self.config.channel_base,
            &address,
            Some(&messages.confirmation),
        );

        let outcome = channel.open(&request);
        match &outcome {
            ChannelOutcome::Opened => {
                self.stage = CheckoutStage::ConfirmationSent;
                info!(
                    delay_ms = self.config.clear_delay.as_millis(),
                    "Confirmation handed off to customer"
                );
                add_breadcrumb("checkout", "Confirmation sent to customer", None);
                notices.notify(Notice::info(
                    "Confirmation sent",
                    "Thank you for your order!",
                ));
                let clear = ScheduledClear::spawn(cart.clone(), self.config.clear_delay);
                self.pending_clear = Some(clear);
            }
            ChannelOutcome::Unavailable { reason } => {
                self.fallback_shown = true;
                warn!(%reason, "Failed to open customer chat");
                notices.notify(Notice::destructive(
                    "Couldn't send confirmation",
                    "Please use the copy option below",
                ));
            }
        }
        Ok(outcome)
    }

    /// Fallback: copy the current step's message to the clipboard.
    ///
    /// Before the order is sent this is the order summary; afterwards it is
    /// the confirmation. A clipboard failure is reported as a notice.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidTransition`] when there is no step in
    /// progress (`Idle` or `ConfirmationSent`).
    pub fn copy_message(
        &mut self,
        clipboard: &mut dyn Clipboard,
        notices: &mut dyn NoticeSink,
    ) -> Result<(), CheckoutError> {
        let (Some(target), Some(draft)) = (self.fallback_target(), self.draft.as_ref()) else {
            return Err(self.invalid("copy a message"));
        };

        let messages = self
            .messages
            .get_or_insert_with(|| HandoffMessages::compose(draft, &self.config.brand));
        let text = match target {
            FallbackTarget::Merchant => &messages.order_summary,
            FallbackTarget::Customer => &messages.confirmation,
        };

        match clipboard.copy(text) {
            Ok(()) => {
                let notice = match target {
                    FallbackTarget::Merchant => Notice::info(
                        "Order copied to clipboard",
                        "Now you can paste it in WhatsApp to the store",
                    ),
                    FallbackTarget::Customer => Notice::info(
                        "Confirmation copied to clipboard",
                        "Now you can paste it in WhatsApp to yourself",
                    ),
                };
                notices.notify(notice);
            }
            Err(e) => {
                warn!(error = %e, "Failed to copy message");
                notices.notify(Notice::destructive(
                    "Couldn't copy to clipboard",
                    "Please select and copy the message manually",
                ));
            }
        }
        Ok(())
    }

    /// Fallback: open the current step's chat without pre-filled text so the
    /// copied message can be pasted.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidTransition`] when there is no step in
    /// progress (`Idle` or `ConfirmationSent`).
    pub fn open_without_text(
        &self,
        channel: &mut dyn MessageChannel,
        notices: &mut dyn NoticeSink,
    ) -> Result<ChannelOutcome, CheckoutError> {
        let (address, description) = match (self.fallback_target(), self.customer_address()) {
            (Some(FallbackTarget::Merchant), _) => (
                self.config.merchant_address.clone(),
                "Please paste the order details in the chat",
            ),
            (Some(FallbackTarget::Customer), Some(address)) => {
                (address, "Please paste the confirmation in the chat")
            }
            _ => return Err(self.invalid("open a chat")),
        };

        let request = ChannelRequest::new(&self.config.channel_base, &address, None);
        let outcome = channel.open(&request);
        match &outcome {
            ChannelOutcome::Opened => {
                notices.notify(Notice::info("Opening WhatsApp", description));
            }
            ChannelOutcome::Unavailable { reason } => {
                warn!(%reason, "Failed to open chat without text");
                notices.notify(Notice::destructive(
                    "Couldn't open WhatsApp",
                    "Please open WhatsApp and paste the message yourself",
                ));
            }
        }
        Ok(outcome)
    }

    /// Abandon the flow. The cart is left untouched; a clear already
    /// scheduled by a completed checkout still runs.
    pub fn reset(&mut self) {
        if let Some(draft) = &self.draft {
            info!(draft_id = %draft.id, stage = %self.stage, "Checkout reset");
        }
        self.stage = CheckoutStage::Idle;
        self.fallback_shown = false;
        self.draft = None;
        self.messages = None;
    }

    const fn invalid(&self, action: &'static str) -> CheckoutError {
        CheckoutError::InvalidTransition {
            action,
            stage: self.stage,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::{CartStore, MemoryStorage};
    use crate::notice::Severity;
    use crib_core::{Price, Product, ProductId, Quantity, VariantOption};

    const NAME: &str = "Ada";
    const PHONE: &str = "08012345678";

    /// Channel double with a scripted sequence of outcomes.
    #[derive(Default)]
    struct ScriptedChannel {
        failures_remaining: usize,
        requests: Vec<ChannelRequest>,
    }

    impl ScriptedChannel {
        fn failing(times: usize) -> Self {
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
                    reason: "popup blocked".to_string(),
                }
            } else {
                ChannelOutcome::Opened
            }
        }
    }

    #[derive(Default)]
    struct RecordingClipboard {
        copied: Vec<String>,
        broken: bool,
    }

    impl Clipboard for RecordingClipboard {
        fn copy(&mut self, text: &str) -> Result<(), ClipboardError> {
            if self.broken {
                return Err(ClipboardError::Unavailable("no display".to_string()));
            }
            self.copied.push(text.to_owned());
            Ok(())
        }
    }

    fn jacket_cart() -> CartHandle {
        let handle = CartHandle::new(CartStore::open(MemoryStorage::new()));
        let jacket = Product::new(
            ProductId::new(1),
            "Jacket",
            Price::new(25_000),
            "/crib1.jpg",
            "Outerwear",
        )
        .unwrap();
        handle.with(|cart| {
            cart.add_item(
                &jacket,
                Quantity::clamped(2),
                VariantOption::parse("Black").unwrap(),
                VariantOption::parse("M").unwrap(),
            );
        });
        handle
    }

    fn flow() -> CheckoutFlow {
        CheckoutFlow::new(HandoffConfig::default())
    }

    /// Flow that has accepted the customer's details for `cart`.
    fn started(cart: &CartHandle) -> CheckoutFlow {
        let mut flow = flow();
        let mut notices = Vec::<Notice>::new();
        flow.begin(NAME, PHONE, cart, &mut notices).unwrap();
        flow
    }

    /// Flow whose order has reached the merchant.
    fn order_sent(cart: &CartHandle) -> CheckoutFlow {
        let mut flow = started(cart);
        let mut channel = ScriptedChannel::default();
        let mut notices = Vec::<Notice>::new();
        flow.send_order(&mut channel, &mut notices).unwrap();
        flow
    }

    fn last_title(notices: &[Notice]) -> &str {
        notices.last().map_or("", |n| n.title.as_str())
    }

    /// Stage named by an `InvalidTransition` rejection.
    fn rejected_in<T>(result: Result<T, CheckoutError>) -> Option<CheckoutStage> {
        match result {
            Err(CheckoutError::InvalidTransition { stage, .. }) => Some(stage),
            _ => None,
        }
    }

    #[test]
    fn test_default_handoff_config() {
        let config = HandoffConfig::default();
        assert_eq!(config.channel_base.as_str(), "https://wa.me/");
        assert_eq!(config.merchant_address, DEFAULT_MERCHANT_ADDRESS);
        assert_eq!(config.clear_delay, Duration::from_secs(2));
    }

    #[test]
    fn test_begin_requires_name() {
        let mut flow = flow();
        let mut notices = Vec::<Notice>::new();

        let result = flow.begin("  ", PHONE, &jacket_cart(), &mut notices);
        let expected = CheckoutError::Validation(ValidationError::MissingName);
        assert_eq!(result, Err(expected));
        assert_eq!(flow.stage(), CheckoutStage::Idle);
        let notice = notices.first().unwrap();
        assert_eq!(notice.title, "Name required");
        assert_eq!(notice.severity, Severity::Destructive);
    }

    #[test]
    fn test_begin_requires_contact() {
        let mut flow = flow();
        let mut notices = Vec::<Notice>::new();

        let result = flow.begin(NAME, "", &jacket_cart(), &mut notices);
        let expected = CheckoutError::Validation(ValidationError::MissingContact);
        assert_eq!(result, Err(expected));
        assert_eq!(flow.stage(), CheckoutStage::Idle);
        assert_eq!(last_title(&notices), "Phone number required");
    }

    #[test]
    fn test_begin_requires_items() {
        let mut flow = flow();
        let mut notices = Vec::<Notice>::new();
        let empty = CartHandle::new(CartStore::open(MemoryStorage::new()));

        let result = flow.begin(NAME, PHONE, &empty, &mut notices);
        let expected = CheckoutError::Validation(ValidationError::EmptyCart);
        assert_eq!(result, Err(expected));
        assert_eq!(flow.stage(), CheckoutStage::Idle);
        assert_eq!(last_title(&notices), "Your cart is empty");
    }

    #[test]
    fn test_begin_captures_snapshot() {
        let cart = jacket_cart();
        let flow = started(&cart);

        assert_eq!(flow.stage(), CheckoutStage::OrderPending);
        let draft = flow.draft().unwrap();
        assert_eq!(draft.customer_name, NAME);
        assert_eq!(draft.snapshot, cart.snapshot());
        assert_eq!(flow.customer_address().as_deref(), Some("2348012345678"));
    }

    #[test]
    fn test_send_order_opens_merchant_chat() {
        let mut flow = started(&jacket_cart());
        let mut channel = ScriptedChannel::default();
        let mut notices = Vec::<Notice>::new();

        let outcome = flow.send_order(&mut channel, &mut notices).unwrap();
        assert!(outcome.is_opened());
        assert_eq!(flow.stage(), CheckoutStage::OrderSent);
        assert!(!flow.fallback_shown());

        let request = channel.requests.first().unwrap();
        let summary = &flow.messages().unwrap().order_summary;
        assert_eq!(request.address, DEFAULT_MERCHANT_ADDRESS);
        assert_eq!(request.text.as_ref(), Some(summary));
        let url = request.url.as_str();
        assert!(url.starts_with("https://wa.me/2349078048405?text="));
        assert_eq!(last_title(&notices), "Order sent to CRIB");
    }

    #[test]
    fn test_send_order_failure_shows_fallback() {
        let cart = jacket_cart();
        let before = cart.snapshot();
        let mut flow = started(&cart);
        let mut channel = ScriptedChannel::failing(1);
        let mut notices = Vec::<Notice>::new();

        let outcome = flow.send_order(&mut channel, &mut notices).unwrap();
        assert!(!outcome.is_opened());
        assert_eq!(flow.stage(), CheckoutStage::OrderPending);
        assert!(flow.fallback_shown());
        assert_eq!(cart.snapshot(), before);
        assert_eq!(last_title(&notices), "Couldn't open WhatsApp");

        // Retry succeeds.
        flow.send_order(&mut channel, &mut notices).unwrap();
        assert_eq!(flow.stage(), CheckoutStage::OrderSent);
    }

    #[test]
    fn test_cannot_confirm_before_order_sent() {
        let cart = jacket_cart();
        let mut channel = ScriptedChannel::default();
        let mut notices = Vec::<Notice>::new();

        let mut flow = flow();
        let result = flow.send_confirmation(&mut channel, &cart, &mut notices);
        assert_eq!(rejected_in(result), Some(CheckoutStage::Idle));

        let mut flow = started(&cart);
        let result = flow.send_confirmation(&mut channel, &cart, &mut notices);
        assert_eq!(rejected_in(result), Some(CheckoutStage::OrderPending));
        assert!(channel.requests.is_empty());
        assert!(!cart.snapshot().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_handoff_clears_cart_after_delay() {
        let cart = jacket_cart();
        let mut flow = order_sent(&cart);
        let mut channel = ScriptedChannel::default();
        let mut notices = Vec::<Notice>::new();
        assert!(!cart.snapshot().is_empty());

        let outcome = flow.send_confirmation(&mut channel, &cart, &mut notices);
        assert!(outcome.unwrap().is_opened());
        assert_eq!(flow.stage(), CheckoutStage::ConfirmationSent);
        assert_eq!(last_title(&notices), "Confirmation sent");

        let request = channel.requests.last().unwrap();
        let confirmation = &flow.messages().unwrap().confirmation;
        assert_eq!(request.address, "2348012345678");
        assert_eq!(request.text.as_ref(), Some(confirmation));

        // Not cleared until the delay elapses.
        assert!(!cart.snapshot().is_empty());
        let scheduled = flow.take_pending_clear().unwrap();
        assert_eq!(scheduled.delay(), DEFAULT_CLEAR_DELAY);
        assert!(scheduled.finished().await);
        assert!(cart.snapshot().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmation_failure_keeps_cart() {
        let cart = jacket_cart();
        let mut flow = order_sent(&cart);
        let mut channel = ScriptedChannel::failing(1);
        let mut notices = Vec::<Notice>::new();

        let outcome = flow.send_confirmation(&mut channel, &cart, &mut notices);
        assert!(!outcome.unwrap().is_opened());
        assert_eq!(flow.stage(), CheckoutStage::OrderSent);
        assert!(flow.fallback_shown());
        assert!(flow.pending_clear().is_none());
        assert_eq!(last_title(&notices), "Couldn't send confirmation");

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(!cart.snapshot().is_empty());
    }

    #[test]
    fn test_begin_after_order_sent_is_rejected() {
        let cart = jacket_cart();
        let mut flow = order_sent(&cart);
        let mut notices = Vec::<Notice>::new();

        let result = flow.begin("Bola", "0809", &cart, &mut notices);
        assert_eq!(rejected_in(result), Some(CheckoutStage::OrderSent));
        assert_eq!(flow.draft().unwrap().customer_name, NAME);
    }

    #[test]
    fn test_copy_message_follows_stage() {
        let cart = jacket_cart();
        let mut clipboard = RecordingClipboard::default();
        let mut notices = Vec::<Notice>::new();

        let mut idle = flow();
        assert!(idle.copy_message(&mut clipboard, &mut notices).is_err());

        let mut flow = started(&cart);
        let mut channel = ScriptedChannel::failing(1);
        flow.send_order(&mut channel, &mut notices).unwrap();
        flow.copy_message(&mut clipboard, &mut notices).unwrap();
        let summary = &flow.messages().unwrap().order_summary;
        assert_eq!(clipboard.copied.last(), Some(summary));
        assert_eq!(last_title(&notices), "Order copied to clipboard");
        assert_eq!(flow.stage(), CheckoutStage::OrderPending);

        flow.send_order(&mut channel, &mut notices).unwrap();
        flow.copy_message(&mut clipboard, &mut notices).unwrap();
        let confirmation = &flow.messages().unwrap().confirmation;
        assert_eq!(clipboard.copied.last(), Some(confirmation));
        assert_eq!(last_title(&notices), "Confirmation copied to clipboard");
        assert_eq!(flow.stage(), CheckoutStage::OrderSent);
    }

    #[test]
    fn test_copy_before_any_send_composes_same_text() {
        let mut flow = started(&jacket_cart());
        let mut clipboard = RecordingClipboard::default();
        let mut channel = ScriptedChannel::failing(1);
        let mut notices = Vec::<Notice>::new();

        flow.copy_message(&mut clipboard, &mut notices).unwrap();
        flow.send_order(&mut channel, &mut notices).unwrap();

        let copied = clipboard.copied.first().map(String::as_str);
        let sent = channel.requests.first().and_then(|r| r.text.as_deref());
        assert_eq!(copied, sent);
    }

    #[test]
    fn test_copy_failure_is_a_notice() {
        let mut flow = started(&jacket_cart());
        let mut clipboard = RecordingClipboard {
            broken: true,
            ..RecordingClipboard::default()
        };
        let mut notices = Vec::<Notice>::new();

        flow.copy_message(&mut clipboard, &mut notices).unwrap();
        assert!(notices.last().is_some_and(Notice::is_destructive));
        assert_eq!(last_title(&notices), "Couldn't copy to clipboard");
    }

    #[test]
    fn test_open_without_text_targets_current_step() {
        let mut flow = started(&jacket_cart());
        let mut channel = ScriptedChannel::default();
        let mut notices = Vec::<Notice>::new();

        flow.open_without_text(&mut channel, &mut notices).unwrap();
        let request = channel.requests.last().unwrap();
        assert_eq!(request.url.as_str(), "https://wa.me/2349078048405");
        assert!(request.text.is_none());
        assert_eq!(flow.stage(), CheckoutStage::OrderPending);

        flow.send_order(&mut channel, &mut notices).unwrap();
        flow.open_without_text(&mut channel, &mut notices).unwrap();
        let request = channel.requests.last().unwrap();
        assert_eq!(request.url.as_str(), "https://wa.me/2348012345678");
        assert_eq!(flow.stage(), CheckoutStage::OrderSent);
        let description = notices.last().map(|n| n.description.as_str());
        let expected = "Please paste the confirmation in the chat";
        assert_eq!(description, Some(expected));
    }

    #[test]
    fn test_open_without_text_failure_is_reported() {
        let cart = jacket_cart();
        let pending = started(&cart);
        let sent = order_sent(&cart);

        for flow in [pending, sent] {
            let stage = flow.stage();
            let fallback_shown = flow.fallback_shown();
            let mut channel = ScriptedChannel::failing(1);
            let mut notices = Vec::<Notice>::new();

            let outcome = flow.open_without_text(&mut channel, &mut notices);
            assert!(!outcome.unwrap().is_opened());
            assert_eq!(channel.requests.len(), 1);
            let notice = notices.last().unwrap();
            assert_eq!(notice.title, "Couldn't open WhatsApp");
            assert!(notice.is_destructive());
            assert_eq!(flow.stage(), stage);
            assert_eq!(flow.fallback_shown(), fallback_shown);
        }
    }

    #[test]
    fn test_fallback_actions_need_a_step_in_progress() {
        let cart = jacket_cart();
        let mut channel = ScriptedChannel::default();
        let mut notices = Vec::<Notice>::new();

        let idle = flow();
        let result = idle.open_without_text(&mut channel, &mut notices);
        assert_eq!(rejected_in(result), Some(CheckoutStage::Idle));
        assert!(channel.requests.is_empty());
        assert!(notices.is_empty());
        assert!(!cart.snapshot().is_empty());
    }

    #[test]
    fn test_reset_leaves_cart() {
        let cart = jacket_cart();
        let mut flow = started(&cart);
        let mut channel = ScriptedChannel::failing(1);
        let mut notices = Vec::<Notice>::new();
        flow.send_order(&mut channel, &mut notices).unwrap();

        flow.reset();
        assert_eq!(flow.stage(), CheckoutStage::Idle);
        assert!(!flow.fallback_shown());
        assert!(flow.draft().is_none());
        assert!(!cart.snapshot().is_empty());
    }
}
