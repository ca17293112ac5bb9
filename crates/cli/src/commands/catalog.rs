//! Catalog listing.

use tracing::info;

use crib_core::VariantOption;
use crib_storefront::state::AppState;

/// List catalog products, optionally restricted to one category.
pub fn list(state: &AppState, category: Option<&str>) {
    let catalog = state.catalog();
    let entries: Vec<_> = match category {
        Some(category) => catalog.by_category(category).collect(),
        None => catalog.products().iter().collect(),
    };

    if entries.is_empty() {
        info!(
            "No products found. Categories: {}",
            catalog.categories().join(", ")
        );
        return;
    }

    for entry in entries {
        let product = &entry.product;
        let colors: Vec<&str> = entry.colors.iter().map(VariantOption::as_str).collect();
        let sizes: Vec<&str> = entry.sizes.iter().map(VariantOption::as_str).collect();
        info!(
            "#{} {} ({}) - {} | colors: {} | sizes: {}",
            product.id(),
            product.name(),
            product.category(),
            product.price(),
            colors.join(", "),
            sizes.join(", ")
        );
    }
}
