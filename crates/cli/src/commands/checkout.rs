//! Interactive two-step checkout.
//!
//! Step 1 opens the store's chat with the order; step 2 opens the customer's
//! own chat with a confirmation. When a chat cannot be opened the customer can
//! retry, copy the message, or open the chat without text and paste it.

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;

use crib_storefront::checkout::{CheckoutFlow, FallbackTarget, MessageChannel};
use crib_storefront::error::StorefrontError;
use crib_storefront::notice::TracingNotices;
use crib_storefront::state::AppState;

use crate::CliError;
use crate::system::{DryRunChannel, SystemChannel, SystemClipboard};

/// What to do after a step could not open its chat.
enum Recovery {
    Retry,
    Quit,
}

/// Line reader over stdin.
struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    fn stdin() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Show `question` and read one trimmed line. `None` at end of input.
    async fn ask(&mut self, question: &str) -> Result<Option<String>, CliError> {
        info!("{question}");
        Ok(self
            .lines
            .next_line()
            .await?
            .map(|line| line.trim().to_lowercase()))
    }
}

/// Run the checkout for the current cart.
///
/// # Errors
///
/// Returns an error if the customer details are rejected or input cannot be
/// read.
pub async fn run(state: &AppState, name: &str, phone: &str, dry_run: bool) -> Result<(), CliError> {
    let mut channel: Box<dyn MessageChannel + Send> = if dry_run {
        Box::new(DryRunChannel)
    } else {
        Box::new(SystemChannel)
    };
    let mut notices = TracingNotices;
    let mut prompt = Prompt::stdin();
    let mut flow = state.checkout();

    flow.begin(name, phone, state.cart(), &mut notices)
        .map_err(StorefrontError::from)?;
    if let Some(draft) = flow.draft() {
        info!(
            "Checking out {} item(s) for {}",
            draft.snapshot.totals.total_items, draft.snapshot.totals.total_price
        );
    }

    // Step 1: order to the store.
    loop {
        let outcome = flow
            .send_order(channel.as_mut(), &mut notices)
            .map_err(StorefrontError::from)?;
        if outcome.is_opened() {
            break;
        }
        if let Recovery::Quit = recover(&mut flow, channel.as_mut(), &mut prompt).await? {
            abandon(&mut flow);
            return Ok(());
        }
    }

    if prompt
        .ask("Send the order in WhatsApp, then press Enter to send your confirmation")
        .await?
        .is_none()
    {
        abandon(&mut flow);
        return Ok(());
    }

    // Step 2: confirmation to the customer.
    loop {
        let outcome = flow
            .send_confirmation(channel.as_mut(), state.cart(), &mut notices)
            .map_err(StorefrontError::from)?;
        if outcome.is_opened() {
            break;
        }
        if let Recovery::Quit = recover(&mut flow, channel.as_mut(), &mut prompt).await? {
            abandon(&mut flow);
            return Ok(());
        }
    }

    if let Some(clear) = flow.take_pending_clear() {
        info!("Clearing your cart in {} ms", clear.delay().as_millis());
        if clear.finished().await {
            info!("Order complete, cart cleared");
        }
    }
    Ok(())
}

/// Offer the fallback actions until the customer retries or quits.
async fn recover(
    flow: &mut CheckoutFlow,
    channel: &mut (dyn MessageChannel + Send),
    prompt: &mut Prompt,
) -> Result<Recovery, CliError> {
    let mut notices = TracingNotices;
    let mut clipboard = SystemClipboard;

    loop {
        let Some(choice) = prompt
            .ask("[r]etry, [c]opy message, [o]pen chat without text, [q]uit")
            .await?
        else {
            return Ok(Recovery::Quit);
        };

        match choice.as_str() {
            "r" | "retry" => return Ok(Recovery::Retry),
            "q" | "quit" => return Ok(Recovery::Quit),
            "c" | "copy" => {
                flow.copy_message(&mut clipboard, &mut notices)
                    .map_err(StorefrontError::from)?;
                let target = flow.fallback_target();
                if let (Some(target), Some(messages)) = (target, flow.messages()) {
                    let text = match target {
                        FallbackTarget::Merchant => &messages.order_summary,
                        FallbackTarget::Customer => &messages.confirmation,
                    };
                    info!("Message:\n{text}");
                }
            }
            "o" | "open" => {
                flow.open_without_text(channel, &mut notices)
                    .map_err(StorefrontError::from)?;
            }
            other => info!("Unknown choice: {other}"),
        }
    }
}

fn abandon(flow: &mut CheckoutFlow) {
    flow.reset();
    info!("Checkout cancelled, your cart has been kept");
}
