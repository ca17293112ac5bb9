//! CRIB CLI - browse the catalog, manage the cart, and check out over WhatsApp.
//!
//! # Usage
//!
//! ```bash
//! # List products, optionally by category
//! crib catalog --category tops
//!
//! # Add a product with its default colour and size
//! crib cart add 1
//!
//! # Add two of a product in a chosen colour and size
//! crib cart add 2 --quantity 2 --color Silver --size L
//!
//! # Show the cart
//! crib cart show
//!
//! # Send the order to the store, then a confirmation to yourself
//! crib checkout --name "Ada" --phone 08012345678
//! ```
//!
//! # Environment Variables
//!
//! See `crib_storefront::config` for the storefront settings. In addition:
//! - `CRIB_CHANNEL_DRY_RUN` - When set to `1` or `true`, chat links are logged
//!   instead of opened

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crib_storefront::config::StorefrontConfig;
use crib_storefront::error::StorefrontError;
use crib_storefront::state::AppState;

mod commands;
mod system;

#[derive(Parser)]
#[command(name = "crib")]
#[command(author, version, about = "CRIB storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products in the catalog
    Catalog {
        /// Only show products in this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Send the cart to the store and a confirmation to yourself over WhatsApp
    Checkout {
        /// Your name
        #[arg(short, long)]
        name: String,

        /// Your WhatsApp number
        #[arg(short, long)]
        phone: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart and its totals
    Show,
    /// Add a product to the cart
    Add {
        /// Product ID
        product_id: i32,

        /// Number of items to add
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        quantity: u32,

        /// Colour (defaults to the product's first colour)
        #[arg(short, long)]
        color: Option<String>,

        /// Size (defaults to M)
        #[arg(short, long)]
        size: Option<String>,
    },
    /// Change the quantity of a product (values below 1 become 1)
    Update {
        /// Product ID
        product_id: i32,

        /// New quantity
        #[arg(allow_hyphen_values = true)]
        quantity: i64,

        /// Only update the line with this colour
        #[arg(short, long, requires = "size")]
        color: Option<String>,

        /// Only update the line with this size
        #[arg(short, long, requires = "color")]
        size: Option<String>,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        product_id: i32,

        /// Only remove the line with this colour
        #[arg(short, long, requires = "size")]
        color: Option<String>,

        /// Only remove the line with this size
        #[arg(short, long, requires = "color")]
        size: Option<String>,
    },
    /// Remove everything from the cart
    Clear,
}

/// Errors surfaced by CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Storefront(#[from] StorefrontError),

    #[error("Failed to read input: {0}")]
    Input(#[from] std::io::Error),
}

impl CliError {
    fn report(&self) {
        match self {
            Self::Storefront(e) => e.report(),
            Self::Input(_) => tracing::error!("Command failed: {self}"),
        }
    }
}

/// Initialize Sentry error tracking.
///
/// Returns a guard that must be kept alive for the duration of the program.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "crib=info,crib_storefront=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match config {
        Ok(config) => run(cli, AppState::open(config)).await,
        Err(e) => Err(StorefrontError::from(e).into()),
    };

    // Returning instead of exiting lets the Sentry guard flush on drop
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, state: AppState) -> Result<(), CliError> {
    match cli.command {
        Commands::Catalog { category } => commands::catalog::list(&state, category.as_deref()),
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&state),
            CartAction::Add {
                product_id,
                quantity,
                color,
                size,
            } => commands::cart::add(
                &state,
                product_id.into(),
                quantity,
                color.as_deref(),
                size.as_deref(),
            )?,
            CartAction::Update {
                product_id,
                quantity,
                color,
                size,
            } => commands::cart::update(
                &state,
                product_id.into(),
                quantity,
                color.as_deref().zip(size.as_deref()),
            )?,
            CartAction::Remove {
                product_id,
                color,
                size,
            } => commands::cart::remove(
                &state,
                product_id.into(),
                color.as_deref().zip(size.as_deref()),
            )?,
            CartAction::Clear => commands::cart::clear(&state),
        },
        Commands::Checkout { name, phone } => {
            let dry_run = system::dry_run_requested();
            commands::checkout::run(&state, &name, &phone, dry_run).await?;
        }
    }
    Ok(())
}
