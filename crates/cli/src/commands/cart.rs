//! Cart commands.
//!
//! The cart is read from and written back to the storage directory on every
//! invocation, so consecutive commands see each other's changes.

use tracing::info;

use crib_core::{LineKey, ProductId, Quantity, VariantOption};
use crib_storefront::error::{StorefrontError, add_breadcrumb};
use crib_storefront::notice::{Notice, NoticeSink, TracingNotices};
use crib_storefront::state::AppState;

/// Option used when a product offers no choices.
const FALLBACK_OPTION: &str = "Default";

/// Log each cart line and the derived totals.
pub fn show(state: &AppState) {
    let snapshot = state.cart().snapshot();
    if snapshot.is_empty() {
        info!("Your cart is empty");
        return;
    }

    for item in &snapshot.items {
        info!(
            "#{} {} [{} / {}] x{} - {}",
            item.id(),
            item.name(),
            item.color(),
            item.size(),
            item.quantity(),
            item.line_total()
        );
    }
    info!(
        "Total items: {} | Total price: {}",
        snapshot.totals.total_items, snapshot.totals.total_price
    );
}

/// Add a catalog product to the cart.
///
/// # Errors
///
/// Returns an error if the product is not in the catalog or an option is
/// blank.
pub fn add(
    state: &AppState,
    id: ProductId,
    quantity: u32,
    color: Option<&str>,
    size: Option<&str>,
) -> Result<(), StorefrontError> {
    let entry = state
        .catalog()
        .find(id)
        .ok_or(StorefrontError::UnknownProduct(id))?;

    let color = choose_option(color, entry.default_color(), |c| entry.offers_color(c))?;
    let size = choose_option(size, entry.default_size(), |s| entry.offers_size(s))?;
    let quantity = Quantity::clamped(i64::from(quantity));

    state
        .cart()
        .with(|cart| cart.add_item(&entry.product, quantity, color, size));

    let product_id = id.to_string();
    let data = [("product_id", product_id.as_str())];
    add_breadcrumb("cart", "Added to cart", Some(&data));
    TracingNotices.notify(Notice::info(
        "Added to cart",
        format!("{} has been added to your cart.", entry.product.name()),
    ));
    show(state);
    Ok(())
}

/// Change the quantity of a product, or of one exact line.
///
/// # Errors
///
/// Returns an error if nothing in the cart matches.
pub fn update(
    state: &AppState,
    id: ProductId,
    quantity: i64,
    line: Option<(&str, &str)>,
) -> Result<(), StorefrontError> {
    let updated = match line {
        Some((color, size)) => {
            let key = line_key(id, color, size)?;
            let changed = state
                .cart()
                .with(|cart| cart.update_line_quantity(&key, quantity));
            usize::from(changed)
        }
        None => state.cart().with(|cart| cart.update_quantity(id, quantity)),
    };

    if updated == 0 {
        return Err(not_in_cart(id, line));
    }
    show(state);
    Ok(())
}

/// Remove a product, or one exact line, from the cart.
///
/// # Errors
///
/// Returns an error if nothing in the cart matches.
pub fn remove(
    state: &AppState,
    id: ProductId,
    line: Option<(&str, &str)>,
) -> Result<(), StorefrontError> {
    let removed = match line {
        Some((color, size)) => {
            let key = line_key(id, color, size)?;
            usize::from(state.cart().with(|cart| cart.remove_line(&key)))
        }
        None => state.cart().with(|cart| cart.remove_item(id)),
    };

    if removed == 0 {
        return Err(not_in_cart(id, line));
    }
    info!("Removed {removed} line(s)");
    show(state);
    Ok(())
}

/// Empty the cart.
pub fn clear(state: &AppState) {
    state.cart().clear();
    info!("Cart cleared");
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Resolve a requested option against what the catalog offers.
///
/// A known option is normalized to the catalog's spelling. Anything else is
/// accepted as given, since the cart does not restrict options.
fn choose_option<'a>(
    requested: Option<&str>,
    default: Option<&VariantOption>,
    offered: impl Fn(&str) -> Option<&'a VariantOption>,
) -> Result<VariantOption, StorefrontError> {
    match (requested, default) {
        (Some(value), _) => match offered(value) {
            Some(option) => Ok(option.clone()),
            None => Ok(VariantOption::parse(value)?),
        },
        (None, Some(default)) => Ok(default.clone()),
        (None, None) => Ok(VariantOption::parse(FALLBACK_OPTION)?),
    }
}

fn line_key(id: ProductId, color: &str, size: &str) -> Result<LineKey, StorefrontError> {
    Ok(LineKey::new(
        id,
        VariantOption::parse(color)?,
        VariantOption::parse(size)?,
    ))
}

fn not_in_cart(id: ProductId, line: Option<(&str, &str)>) -> StorefrontError {
    match line {
        Some((color, size)) => StorefrontError::NotInCart(format!("#{id} ({color} / {size})")),
        None => StorefrontError::NotInCart(format!("#{id}")),
    }
}
