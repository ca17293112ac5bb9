//! Catalog products and cart line items.
//!
//! A [`CartItem`] serializes to the flat record kept in the durable cart slot:
//!
//! ```json
//! {"id":1,"name":"Time velo edition","price":25000,"image":"/crib1.jpg",
//!  "category":"Outerwear","quantity":2,"color":"Stealth Black","size":"M"}
//! ```

use core::fmt;

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;
use super::quantity::Quantity;

/// Errors that can occur when constructing a [`Product`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductError {
    /// The display name is empty.
    #[error("product name cannot be empty")]
    EmptyName,
}

/// Errors that can occur when constructing a [`VariantOption`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionError {
    /// The option value is empty or whitespace.
    #[error("variant option cannot be empty")]
    Empty,
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product, read-only to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProductRecord")]
pub struct Product {
    id: ProductId,
    name: String,
    price: Price,
    image: String,
    category: String,
}

/// Unvalidated wire form of [`Product`].
#[derive(Deserialize)]
struct ProductRecord {
    id: ProductId,
    name: String,
    price: Price,
    #[serde(default)]
    image: String,
    #[serde(default)]
    category: String,
}

impl TryFrom<ProductRecord> for Product {
    type Error = ProductError;

    fn try_from(record: ProductRecord) -> Result<Self, Self::Error> {
        Self::new(
            record.id,
            record.name,
            record.price,
            record.image,
            record.category,
        )
    }
}

impl Product {
    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::EmptyName`] if `name` is empty after trimming.
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        price: Price,
        image: impl Into<String>,
        category: impl Into<String>,
    ) -> Result<Self, ProductError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ProductError::EmptyName);
        }
        Ok(Self {
            id,
            name,
            price,
            image: image.into(),
            category: category.into(),
        })
    }

    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }
}

// =============================================================================
// Variant Options
// =============================================================================

/// A non-empty colour or size label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VariantOption(String);

impl VariantOption {
    /// Parse an option label, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`OptionError::Empty`] if the label is empty after trimming.
    pub fn parse(s: &str) -> Result<Self, OptionError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(OptionError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for VariantOption {
    type Error = OptionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VariantOption> for String {
    fn from(option: VariantOption) -> Self {
        option.0
    }
}

impl std::str::FromStr for VariantOption {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VariantOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Cart Items
// =============================================================================

/// Identity of a cart line: the same product in another colour or size is a
/// different line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    pub id: ProductId,
    pub color: VariantOption,
    pub size: VariantOption,
}

impl LineKey {
    #[must_use]
    pub const fn new(id: ProductId, color: VariantOption, size: VariantOption) -> Self {
        Self { id, color, size }
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.id, self.color, self.size)
    }
}

/// A product in the cart with its chosen colour, size, and quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    product: Product,
    quantity: Quantity,
    color: VariantOption,
    size: VariantOption,
}

impl CartItem {
    #[must_use]
    pub const fn new(
        product: Product,
        quantity: Quantity,
        color: VariantOption,
        size: VariantOption,
    ) -> Self {
        Self {
            product,
            quantity,
            color,
            size,
        }
    }

    #[must_use]
    pub const fn product(&self) -> &Product {
        &self.product
    }

    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.product.name
    }

    #[must_use]
    pub const fn unit_price(&self) -> Price {
        self.product.price
    }

    #[must_use]
    pub const fn quantity(&self) -> Quantity {
        self.quantity
    }

    #[must_use]
    pub const fn color(&self) -> &VariantOption {
        &self.color
    }

    #[must_use]
    pub const fn size(&self) -> &VariantOption {
        &self.size
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }

    /// The `(id, color, size)` identity of this line.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey::new(self.product.id, self.color.clone(), self.size.clone())
    }

    /// Whether this line has the given identity.
    #[must_use]
    pub fn matches(&self, key: &LineKey) -> bool {
        self.product.id == key.id && self.color == key.color && self.size == key.size
    }

    /// Replace the quantity.
    pub const fn set_quantity(&mut self, quantity: Quantity) {
        self.quantity = quantity;
    }

    /// Merge another `quantity` into this line.
    pub const fn add_quantity(&mut self, quantity: Quantity) {
        self.quantity = self.quantity.saturating_add(quantity);
    }
}
