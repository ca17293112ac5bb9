//! Deferred cart clear after a completed checkout.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cart::CartHandle;

/// Handle to a cart clear scheduled after a delay.
///
/// The delay lets the customer's chat open before the cart empties. The clear
/// runs on the current tokio runtime, or on a dedicated thread when called
/// outside one. Dropping the handle does not cancel it.
#[derive(Debug)]
pub struct ScheduledClear {
    timer: Timer,
    delay: Duration,
}

#[derive(Debug)]
enum Timer {
    Task(JoinHandle<()>),
    Thread {
        handle: thread::JoinHandle<()>,
        cancelled: Arc<AtomicBool>,
        done: oneshot::Receiver<()>,
    },
    /// No timer could be started; the cart was cleared on the spot.
    Immediate,
}

impl ScheduledClear {
    /// Schedule `cart` to be cleared after `delay`.
    #[must_use]
    pub fn spawn(cart: CartHandle, delay: Duration) -> Self {
        let timer = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => Timer::Task(runtime.spawn(async move {
                tokio::time::sleep(delay).await;
                cart.clear();
                info!("Cart cleared after completed checkout");
            })),
            Err(_) => spawn_thread(&cart, delay),
        };

        Self { timer, delay }
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancel the clear if it has not run yet.
    pub fn cancel(&self) {
        match &self.timer {
            Timer::Task(task) => task.abort(),
            Timer::Thread { cancelled, .. } => cancelled.store(true, Ordering::SeqCst),
            Timer::Immediate => {}
        }
    }

    /// Whether the clear has run or been cancelled.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        match &self.timer {
            Timer::Task(task) => task.is_finished(),
            Timer::Thread { handle, .. } => handle.is_finished(),
            Timer::Immediate => true,
        }
    }

    /// Wait for the scheduled clear.
    ///
    /// Returns `true` if the cart was cleared, `false` if the clear was
    /// cancelled or its task failed.
    pub async fn finished(self) -> bool {
        match self.timer {
            Timer::Task(task) => task.await.is_ok(),
            Timer::Thread { done, .. } => done.await.is_ok(),
            Timer::Immediate => true,
        }
    }
}

/// Clear `cart` from a plain thread after `delay`.
fn spawn_thread(cart: &CartHandle, delay: Duration) -> Timer {
    let cancelled = Arc::new(AtomicBool::new(false));
    let (tx, done) = oneshot::channel();
    let flag = Arc::clone(&cancelled);

    let spawned = thread::Builder::new()
        .name("crib-cart-clear".to_string())
        .spawn({
            let cart = cart.clone();
            move || {
                thread::sleep(delay);
                if flag.load(Ordering::SeqCst) {
                    return;
                }
                cart.clear();
                info!("Cart cleared after completed checkout");
                let _ = tx.send(());
            }
        });

    match spawned {
        Ok(handle) => Timer::Thread {
            handle,
            cancelled,
            done,
        },
        Err(e) => {
            warn!(error = %e, "Failed to start cart clear timer, clearing now");
            cart.clear();
            Timer::Immediate
        }
    }
}
