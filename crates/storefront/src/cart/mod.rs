//! The multi-item cart: variant-keyed line items with derived totals.
//!
//! [`CartStore`] is the only owner of cart state. Every mutation recomputes
//! the totals and writes the full line-item list through the storage port
//! before returning, so persisted state always matches memory. Hydration at
//! construction tolerates absent or corrupt records by starting empty.

mod types;

pub use types::{Cart, CartLineItem, ProductSummary, SelectionError, VariantChoice, VariantKey};

use rust_decimal::Decimal;
use tracing::instrument;

use crate::storage::{KeyValueStore, StorageError, keys};

/// Owns the cart and enforces its totals invariant.
#[derive(Debug, Clone, Default)]
pub struct CartStore {
    cart: Cart,
}

impl CartStore {
    /// Hydrate the cart from persisted storage.
    ///
    /// An absent or malformed record yields an empty cart. Totals are always
    /// recomputed from the loaded items rather than trusted from disk.
    #[must_use]
    pub fn load<S: KeyValueStore>(storage: &S) -> Self {
        let line_items: Vec<CartLineItem> = storage.get(keys::CART_ITEMS).unwrap_or_default();
        let mut store = Self {
            cart: Cart {
                line_items,
                total_quantity: 0,
                total_amount: Decimal::ZERO,
            },
        };
        store.recompute_totals();
        store
    }

    /// The current cart state.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Add one unit of a product variant.
    ///
    /// If a line with the same variant key exists its quantity increments;
    /// otherwise a new line is appended at quantity 1, preserving insertion
    /// order. Variant validation happens at [`VariantChoice`] construction,
    /// so this operation has no validation error path.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if persisting the updated cart fails.
    #[instrument(skip(self, storage, product, choice), fields(product_id = %product.id))]
    pub fn add_item<S: KeyValueStore>(
        &mut self,
        storage: &mut S,
        product: &ProductSummary,
        choice: &VariantChoice,
    ) -> Result<(), StorageError> {
        let key = VariantKey::new(product.id.clone(), choice);
        match self.line_mut(&key) {
            Some(line) => line.quantity += 1,
            None => self.cart.line_items.push(CartLineItem::new(product, choice)),
        }
        self.commit(storage)
    }

    /// Remove the line with the given variant key. Removing an absent line
    /// is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if persisting the updated cart fails.
    #[instrument(skip(self, storage), fields(product_id = %key.product_id))]
    pub fn remove_item<S: KeyValueStore>(
        &mut self,
        storage: &mut S,
        key: &VariantKey,
    ) -> Result<(), StorageError> {
        self.cart.line_items.retain(|line| line.variant_key() != *key);
        self.commit(storage)
    }

    /// Increment the quantity of the line with the given variant key.
    /// No-op if the line is absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if persisting the updated cart fails.
    #[instrument(skip(self, storage), fields(product_id = %key.product_id))]
    pub fn increment_quantity<S: KeyValueStore>(
        &mut self,
        storage: &mut S,
        key: &VariantKey,
    ) -> Result<(), StorageError> {
        if let Some(line) = self.line_mut(key) {
            line.quantity += 1;
        }
        self.commit(storage)
    }

    /// Decrement the quantity of the line with the given variant key.
    ///
    /// Quantity never drops below 1: at the floor this is a no-op, and
    /// taking the line out of the cart stays an explicit
    /// [`remove_item`](Self::remove_item) action.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if persisting the updated cart fails.
    #[instrument(skip(self, storage), fields(product_id = %key.product_id))]
    pub fn decrement_quantity<S: KeyValueStore>(
        &mut self,
        storage: &mut S,
        key: &VariantKey,
    ) -> Result<(), StorageError> {
        if let Some(line) = self.line_mut(key)
            && line.quantity > 1
        {
            line.quantity -= 1;
        }
        self.commit(storage)
    }

    /// Empty the cart and delete its persisted record.
    ///
    /// The record is removed outright rather than overwritten with an empty
    /// list, which is why this cannot fail.
    #[instrument(skip(self, storage))]
    pub fn clear<S: KeyValueStore>(&mut self, storage: &mut S) {
        self.cart.line_items.clear();
        self.recompute_totals();
        storage.remove(keys::CART_ITEMS);
    }

    fn line_mut(&mut self, key: &VariantKey) -> Option<&mut CartLineItem> {
        self.cart
            .line_items
            .iter_mut()
            .find(|line| line.variant_key() == *key)
    }

    /// Recompute totals and persist the full line-item list.
    fn commit<S: KeyValueStore>(&mut self, storage: &mut S) -> Result<(), StorageError> {
        self.recompute_totals();
        storage.set(keys::CART_ITEMS, &self.cart.line_items)
    }

    fn recompute_totals(&mut self) {
        self.cart.total_quantity = self.cart.line_items.iter().map(|line| line.quantity).sum();
        self.cart.total_amount = self
            .cart
            .line_items
            .iter()
            .map(CartLineItem::line_total)
            .sum();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use thread_haven_core::Price;

    fn shirt_a() -> ProductSummary {
        ProductSummary {
            id: "shirt-a".into(),
            name: "Oxford Shirt".to_owned(),
            price: Price::from(500_u32),
            image: "/img/shirt-a.jpg".to_owned(),
        }
    }

    fn shirt_b() -> ProductSummary {
        ProductSummary {
            id: "shirt-b".into(),
            name: "Linen Shirt".to_owned(),
            price: Price::from(800_u32),
            image: "/img/shirt-b.jpg".to_owned(),
        }
    }

    fn m_black() -> VariantChoice {
        VariantChoice::new("M", "Black").unwrap()
    }

    #[test]
    fn test_empty_selection_rejected() {
        assert_eq!(
            VariantChoice::new("", "Black"),
            Err(SelectionError::MissingSize)
        );
        assert_eq!(
            VariantChoice::new("M", "  "),
            Err(SelectionError::MissingColor)
        );
    }

    #[test]
    fn test_add_same_variant_merges() {
        let mut storage = MemoryStore::new();
        let mut cart = CartStore::load(&storage);

        cart.add_item(&mut storage, &shirt_a(), &m_black()).unwrap();
        cart.add_item(&mut storage, &shirt_a(), &m_black()).unwrap();

        assert_eq!(cart.cart().line_items.len(), 1);
        assert_eq!(cart.cart().line_items[0].quantity, 2);
        assert_eq!(cart.cart().total_quantity, 2);
        assert_eq!(cart.cart().total_amount, Decimal::from(1000));
    }

    #[test]
    fn test_different_variants_are_distinct_lines() {
        let mut storage = MemoryStore::new();
        let mut cart = CartStore::load(&storage);

        cart.add_item(&mut storage, &shirt_a(), &m_black()).unwrap();
        cart.add_item(
            &mut storage,
            &shirt_a(),
            &VariantChoice::new("L", "Black").unwrap(),
        )
        .unwrap();

        assert_eq!(cart.cart().line_items.len(), 2);
        assert_eq!(cart.cart().total_quantity, 2);
    }

    #[test]
    fn test_totals_consistent_after_every_prefix() {
        let mut storage = MemoryStore::new();
        let mut cart = CartStore::load(&storage);

        let adds = [
            (shirt_a(), m_black()),
            (shirt_b(), VariantChoice::new("L", "White").unwrap()),
            (shirt_a(), m_black()),
            (shirt_a(), VariantChoice::new("S", "Blue").unwrap()),
        ];

        for (product, choice) in &adds {
            cart.add_item(&mut storage, product, choice).unwrap();

            let expected_qty: u32 = cart.cart().line_items.iter().map(|l| l.quantity).sum();
            let expected_amount: Decimal = cart
                .cart()
                .line_items
                .iter()
                .map(CartLineItem::line_total)
                .sum();
            assert_eq!(cart.cart().total_quantity, expected_qty);
            assert_eq!(cart.cart().total_amount, expected_amount);
        }
    }

    #[test]
    fn test_remove_then_re_add_starts_fresh() {
        let mut storage = MemoryStore::new();
        let mut cart = CartStore::load(&storage);
        let key = VariantKey::new("shirt-a".into(), &m_black());

        cart.add_item(&mut storage, &shirt_a(), &m_black()).unwrap();
        cart.add_item(&mut storage, &shirt_a(), &m_black()).unwrap();
        cart.remove_item(&mut storage, &key).unwrap();
        assert!(cart.cart().is_empty());

        cart.add_item(&mut storage, &shirt_a(), &m_black()).unwrap();
        assert_eq!(cart.cart().line_items[0].quantity, 1);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut storage = MemoryStore::new();
        let mut cart = CartStore::load(&storage);

        cart.add_item(&mut storage, &shirt_a(), &m_black()).unwrap();
        let before = cart.cart().clone();

        let absent = VariantKey::new("shirt-z".into(), &m_black());
        cart.remove_item(&mut storage, &absent).unwrap();
        assert_eq!(cart.cart(), &before);
    }

    #[test]
    fn test_decrement_floors_at_one() {
        let mut storage = MemoryStore::new();
        let mut cart = CartStore::load(&storage);
        let key = VariantKey::new("shirt-a".into(), &m_black());

        cart.add_item(&mut storage, &shirt_a(), &m_black()).unwrap();
        cart.decrement_quantity(&mut storage, &key).unwrap();

        // Still present at quantity 1, not removed.
        assert_eq!(cart.cart().line_items.len(), 1);
        assert_eq!(cart.cart().line_items[0].quantity, 1);
    }

    #[test]
    fn test_increment_and_decrement_adjust_totals() {
        let mut storage = MemoryStore::new();
        let mut cart = CartStore::load(&storage);
        let key = VariantKey::new("shirt-a".into(), &m_black());

        cart.add_item(&mut storage, &shirt_a(), &m_black()).unwrap();
        cart.increment_quantity(&mut storage, &key).unwrap();
        cart.increment_quantity(&mut storage, &key).unwrap();
        assert_eq!(cart.cart().total_quantity, 3);
        assert_eq!(cart.cart().total_amount, Decimal::from(1500));

        cart.decrement_quantity(&mut storage, &key).unwrap();
        assert_eq!(cart.cart().total_quantity, 2);
        assert_eq!(cart.cart().total_amount, Decimal::from(1000));
    }

    #[test]
    fn test_persistence_round_trip() {
        let mut storage = MemoryStore::new();
        let mut cart = CartStore::load(&storage);

        cart.add_item(&mut storage, &shirt_a(), &m_black()).unwrap();
        cart.add_item(&mut storage, &shirt_b(), &m_black()).unwrap();
        cart.increment_quantity(&mut storage, &VariantKey::new("shirt-b".into(), &m_black()))
            .unwrap();

        let rehydrated = CartStore::load(&storage);
        assert_eq!(rehydrated.cart(), cart.cart());
    }

    #[test]
    fn test_hydration_from_corrupt_record_starts_empty() {
        let mut storage = MemoryStore::new();
        storage
            .set_raw(keys::CART_ITEMS, "not a cart".to_owned())
            .unwrap();

        let cart = CartStore::load(&storage);
        assert!(cart.cart().is_empty());
        assert_eq!(cart.cart().total_amount, Decimal::ZERO);
    }

    #[test]
    fn test_clear_deletes_persisted_record() {
        let mut storage = MemoryStore::new();
        let mut cart = CartStore::load(&storage);

        cart.add_item(&mut storage, &shirt_a(), &m_black()).unwrap();
        assert!(storage.contains(keys::CART_ITEMS));

        cart.clear(&mut storage);
        assert!(cart.cart().is_empty());
        assert_eq!(cart.cart().total_quantity, 0);
        // The record is deleted, not rewritten as an empty list.
        assert!(!storage.contains(keys::CART_ITEMS));
    }
}
