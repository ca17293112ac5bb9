//! Built-in product catalog.
//!
//! The storefront sells a small fixed collection. Each entry carries the
//! product record stored in cart lines plus the colours and sizes offered for
//! it. The cart does not consult the catalog; callers look products up here
//! before calling [`CartStore::add_item`](crate::cart::CartStore::add_item).

use serde::Serialize;
use tracing::warn;

use crib_core::{Price, Product, ProductId, VariantOption};

/// Sizes offered for every product.
pub const SIZES: &[&str] = &["S", "M", "L", "XL"];

/// Size preselected when adding without a choice.
pub const DEFAULT_SIZE: &str = "M";

struct Listing {
    id: i32,
    name: &'static str,
    price: u64,
    image: &'static str,
    category: &'static str,
    colors: &'static [&'static str],
}

const LISTINGS: &[Listing] = &[
    Listing {
        id: 1,
        name: "Time velo edition",
        price: 25_000,
        image: "/crib1.jpg",
        category: "Outerwear",
        colors: &["Cyber Blue", "Neon Pink", "Stealth Black"],
    },
    Listing {
        id: 2,
        name: "Awakening edition",
        price: 25_000,
        image: "/crib2.jpg",
        category: "Tops",
        colors: &["Obsidian", "Silver", "Crimson"],
    },
    Listing {
        id: 3,
        name: "Steeze 425 edition",
        price: 21_000,
        image: "/crib3.jpg",
        category: "Bottoms",
        colors: &["Graphite", "Cobalt", "Ash"],
    },
    Listing {
        id: 4,
        name: "La crib da drop edition",
        price: 25_000,
        image: "/crib5.jpg",
        category: "Tops",
        colors: &["Midnight", "Azure", "Eclipse"],
    },
    Listing {
        id: 5,
        name: "La crib da drop edition",
        price: 25_000,
        image: "/crib6.jpg",
        category: "Tops",
        colors: &["Default"],
    },
    Listing {
        id: 6,
        name: "Crib crop top for female",
        price: 10_000,
        image: "/crib8.jpg",
        category: "Tops",
        colors: &["Default"],
    },
];

/// A product together with its purchasable options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub product: Product,
    pub colors: Vec<VariantOption>,
    pub sizes: Vec<VariantOption>,
}

impl CatalogEntry {
    /// First colour offered, preselected when adding without a choice.
    #[must_use]
    pub fn default_color(&self) -> Option<&VariantOption> {
        self.colors.first()
    }

    /// Size preselected when adding without a choice.
    #[must_use]
    pub fn default_size(&self) -> Option<&VariantOption> {
        self.sizes
            .iter()
            .find(|s| s.as_str() == DEFAULT_SIZE)
            .or_else(|| self.sizes.first())
    }

    /// Whether `color` is offered for this product (case-insensitive).
    #[must_use]
    pub fn offers_color(&self, color: &str) -> Option<&VariantOption> {
        self.colors
            .iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(color.trim()))
    }

    /// Whether `size` is offered for this product (case-insensitive).
    #[must_use]
    pub fn offers_size(&self, size: &str) -> Option<&VariantOption> {
        self.sizes
            .iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(size.trim()))
    }
}

/// Read-only product catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// The storefront's built-in collection.
    #[must_use]
    pub fn builtin() -> Self {
        let entries = LISTINGS
            .iter()
            .filter_map(|listing| match listing.to_entry() {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(product_id = listing.id, error = %e, "Skipping invalid catalog listing");
                    None
                }
            })
            .collect();
        Self { entries }
    }

    /// Build a catalog from explicit entries.
    #[must_use]
    pub const fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn products(&self) -> &[CatalogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.product.id() == id)
    }

    /// Entries in `category`, matched case-insensitively.
    pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a CatalogEntry> {
        let category = category.trim();
        self.entries
            .iter()
            .filter(move |e| e.product.category().eq_ignore_ascii_case(category))
    }

    /// Distinct categories in listing order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for entry in &self.entries {
            let category = entry.product.category();
            if !categories.contains(&category) {
                categories.push(category);
            }
        }
        categories
    }
}

impl Listing {
    fn to_entry(&self) -> Result<CatalogEntry, crate::error::StorefrontError> {
        let product = Product::new(
            ProductId::new(self.id),
            self.name,
            Price::new(self.price),
            self.image,
            self.category,
        )?;
        let colors = self
            .colors
            .iter()
            .map(|c| VariantOption::parse(c))
            .collect::<Result<Vec<_>, _>>()?;
        let sizes = SIZES
            .iter()
            .map(|s| VariantOption::parse(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CatalogEntry {
            product,
            colors,
            sizes,
        })
    }
}
