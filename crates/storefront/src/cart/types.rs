//! Cart data model: variant keys, line items, and the cart itself.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use thread_haven_core::{Price, ProductId};

/// Errors selecting a product variant.
///
/// A product only becomes a line item once both a size and a color are
/// chosen; an empty selection never reaches the cart.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SelectionError {
    /// No size was selected.
    #[error("a size must be selected")]
    MissingSize,
    /// No color was selected.
    #[error("a color must be selected")]
    MissingColor,
}

/// A validated size/color selection.
///
/// Construction rejects empty selections, so any `VariantChoice` in hand is
/// safe to turn into a line item - the cart operations have no error path
/// for invalid variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantChoice {
    size: String,
    color: String,
}

impl VariantChoice {
    /// Validate a size/color selection.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError`] if either value is empty or whitespace.
    pub fn new(size: &str, color: &str) -> Result<Self, SelectionError> {
        let size = size.trim();
        let color = color.trim();
        if size.is_empty() {
            return Err(SelectionError::MissingSize);
        }
        if color.is_empty() {
            return Err(SelectionError::MissingColor);
        }
        Ok(Self {
            size: size.to_owned(),
            color: color.to_owned(),
        })
    }

    /// The selected size.
    #[must_use]
    pub fn size(&self) -> &str {
        &self.size
    }

    /// The selected color.
    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }
}

/// Composite line-item identity: product plus the chosen variant.
///
/// Two cart entries are the same line item iff their keys are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantKey {
    /// The product this line refers to.
    pub product_id: ProductId,
    /// The chosen size.
    pub size: String,
    /// The chosen color.
    pub color: String,
}

impl VariantKey {
    /// Build a key from a product and a validated variant choice.
    #[must_use]
    pub fn new(product_id: ProductId, choice: &VariantChoice) -> Self {
        Self {
            product_id,
            size: choice.size().to_owned(),
            color: choice.color().to_owned(),
        }
    }
}

/// Product descriptor handed over by the catalog when an item is added.
///
/// The catalog service owns the rest of the product record; the cart only
/// keeps what it needs to display and price a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    /// Catalog identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price at the time of adding. Price changes between add-to-cart
    /// and checkout are not reconciled (deliberately out of scope).
    pub price: Price,
    /// Product image URL.
    pub image: String,
}

/// One line of the cart: a product variant and its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Catalog identifier of the product.
    pub product_id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub unit_price: Price,
    /// Product image URL.
    pub image: String,
    /// Chosen size.
    pub size: String,
    /// Chosen color.
    pub color: String,
    /// Number of units; always at least 1.
    pub quantity: u32,
}

impl CartLineItem {
    /// Create a fresh line at quantity 1.
    #[must_use]
    pub fn new(product: &ProductSummary, choice: &VariantChoice) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            image: product.image.clone(),
            size: choice.size().to_owned(),
            color: choice.color().to_owned(),
            quantity: 1,
        }
    }

    /// The identity of this line.
    #[must_use]
    pub fn variant_key(&self) -> VariantKey {
        VariantKey {
            product_id: self.product_id.clone(),
            size: self.size.clone(),
            color: self.color.clone(),
        }
    }

    /// `unit_price x quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price.times(self.quantity)
    }
}

/// The cart: line items in insertion order plus derived totals.
///
/// Totals are recomputed after every mutation and never drift from the
/// line items; that invariant is maintained by [`CartStore`], which owns
/// the only mutable access.
///
/// [`CartStore`]: super::CartStore
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    /// Line items in the order they were first added.
    pub line_items: Vec<CartLineItem>,
    /// Sum of all line quantities.
    pub total_quantity: u32,
    /// Sum of all line totals.
    pub total_amount: Decimal,
}

impl Cart {
    /// Whether the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty()
    }
}
