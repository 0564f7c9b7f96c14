//! Cart store: the customer's order-in-progress.
//!
//! Purely local - the cart never talks to the network. The whole item list
//! is persisted JSON-serialized under a fixed storage key after every
//! mutation and rehydrated in full at construction, so an order survives a
//! process restart (single-writer, single-device; no conflict resolution).

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use cafecraft_core::{Price, ProductId};

use crate::storage::{StorageBackend, keys};

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product identifier; unique within the cart.
    pub id: ProductId,
    /// Display title, copied from the product at add time.
    pub title: String,
    /// Unit price, copied from the product at add time.
    pub price: Price,
    /// Always >= 1; an update that would reach 0 removes the line instead.
    pub quantity: u32,
    /// Product image reference, if the product has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// The fields a product must supply to be added to the cart.
///
/// Exactly `id`, `title`, `price` and an optional `image`; anything else is
/// rejected rather than silently carried along.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductInput {
    /// Product identifier.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price.
    pub price: Price,
    /// Product image reference.
    #[serde(default)]
    pub image: Option<String>,
}

/// Process-wide container for the cart.
pub struct CartStore {
    storage: Arc<dyn StorageBackend>,
    items: RwLock<Vec<CartItem>>,
}

impl CartStore {
    /// Open the cart over a storage backend, rehydrating any persisted
    /// contents. Corrupt or unreadable persisted data yields the empty cart.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        let items = match storage.get(keys::CART) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "discarding unreadable persisted cart");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "cart storage unavailable, starting empty");
                Vec::new()
            }
        };

        Self {
            storage,
            items: RwLock::new(items),
        }
    }

    /// Add a product: a line already carrying this product id gains exactly
    /// one unit, otherwise a new line with quantity 1 is appended.
    pub fn add_item(&self, product: &ProductInput) {
        let mut items = self.items.write();
        if let Some(item) = items.iter_mut().find(|item| item.id == product.id) {
            item.quantity += 1;
        } else {
            items.push(CartItem {
                id: product.id,
                title: product.title.clone(),
                price: product.price,
                quantity: 1,
                image: product.image.clone(),
            });
        }
        self.persist(&items);
    }

    /// Remove the line for a product id. Absent ids are a no-op.
    pub fn remove_item(&self, id: ProductId) {
        let mut items = self.items.write();
        let before = items.len();
        items.retain(|item| item.id != id);
        if items.len() != before {
            self.persist(&items);
        }
    }

    /// Set a line's quantity exactly. A quantity of 0 or below removes the
    /// line instead, so a present line always has quantity >= 1.
    pub fn update_quantity(&self, id: ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(id);
            return;
        }

        let mut items = self.items.write();
        if let Some(item) = items.iter_mut().find(|item| item.id == id) {
            item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
            self.persist(&items);
        }
    }

    /// Empty the cart unconditionally.
    pub fn clear(&self) {
        let mut items = self.items.write();
        items.clear();
        self.persist(&items);
    }

    /// Sum of `price * quantity` over all lines; 0 for an empty cart.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.items
            .read()
            .iter()
            .map(|item| item.price * item.quantity)
            .sum()
    }

    /// Sum of quantities over all lines; 0 for an empty cart.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items
            .read()
            .iter()
            .map(|item| u64::from(item.quantity))
            .sum()
    }

    /// The lines in insertion order (display order; totals don't depend on
    /// it).
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.items.read().clone()
    }

    /// Write the list through to durable storage. Persistence failures are
    /// logged and do not roll back the in-memory commit.
    fn persist(&self, items: &[CartItem]) {
        let serialized = match serde_json::to_string(items) {
            Ok(serialized) => serialized,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize cart");
                return;
            }
        };
        if let Err(e) = self.storage.set(keys::CART, &serialized) {
            tracing::warn!(error = %e, "failed to persist cart");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn product(id: i64, title: &str, price: i64) -> ProductInput {
        ProductInput {
            id: ProductId::new(id),
            title: title.to_string(),
            price: Price::from(price),
            image: None,
        }
    }

    fn empty_cart() -> CartStore {
        CartStore::new(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_empty_cart_derived_values() {
        let cart = empty_cart();
        assert_eq!(cart.total_price(), Price::ZERO);
        assert_eq!(cart.item_count(), 0);
        assert!(cart.items().is_empty());
    }

    #[test]
    fn test_repeat_adds_collapse_to_one_line() {
        let cart = empty_cart();
        let espresso = product(1, "Espresso", 50_000);

        for _ in 0..5 {
            cart.add_item(&espresso);
        }

        let items = cart.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items.first().unwrap().quantity, 5);
    }

    #[test]
    fn test_order_flow_scenario() {
        let cart = empty_cart();
        let espresso = product(1, "Espresso", 50_000);

        cart.add_item(&espresso);
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_price(), Price::from(50_000));

        cart.add_item(&espresso);
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total_price(), Price::from(100_000));

        cart.update_quantity(ProductId::new(1), 0);
        assert!(cart.items().is_empty());
        assert_eq!(cart.total_price(), Price::ZERO);
    }

    #[test]
    fn test_totals_across_multiple_lines() {
        let cart = empty_cart();
        cart.add_item(&product(1, "Espresso", 50_000));
        cart.add_item(&product(2, "Cheesecake", 120_000));
        cart.update_quantity(ProductId::new(1), 3);

        assert_eq!(cart.item_count(), 4);
        assert_eq!(cart.total_price(), Price::from(270_000));
    }

    #[test]
    fn test_update_quantity_sets_exact_value() {
        let cart = empty_cart();
        cart.add_item(&product(1, "Espresso", 50_000));
        cart.add_item(&product(1, "Espresso", 50_000));

        cart.update_quantity(ProductId::new(1), 7);
        assert_eq!(cart.items().first().unwrap().quantity, 7);
    }

    #[test]
    fn test_nonpositive_quantity_removes_line() {
        for bad_quantity in [0, -5] {
            let cart = empty_cart();
            cart.add_item(&product(1, "Espresso", 50_000));
            cart.update_quantity(ProductId::new(1), bad_quantity);
            assert!(cart.items().is_empty(), "quantity {bad_quantity}");
        }
    }

    #[test]
    fn test_update_and_remove_absent_id_are_noops() {
        let cart = empty_cart();
        cart.add_item(&product(1, "Espresso", 50_000));
        let before = cart.items();

        cart.update_quantity(ProductId::new(99), 0);
        cart.update_quantity(ProductId::new(99), 4);
        cart.remove_item(ProductId::new(99));

        assert_eq!(cart.items(), before);
    }

    #[test]
    fn test_clear_empties_unconditionally() {
        let cart = empty_cart();
        cart.add_item(&product(1, "Espresso", 50_000));
        cart.add_item(&product(2, "Cheesecake", 120_000));

        cart.clear();
        assert!(cart.items().is_empty());
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_rehydration_preserves_items_and_order() {
        let storage: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::new());

        let cart = CartStore::new(Arc::clone(&storage));
        cart.add_item(&product(2, "Cheesecake", 120_000));
        cart.add_item(&product(1, "Espresso", 50_000));
        cart.add_item(&product(1, "Espresso", 50_000));
        drop(cart);

        let reopened = CartStore::new(storage);
        let items = reopened.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items.first().unwrap().id, ProductId::new(2));
        assert_eq!(items.get(1).unwrap().quantity, 2);
        assert_eq!(reopened.total_price(), Price::from(220_000));
    }

    #[test]
    fn test_corrupt_persisted_cart_rehydrates_empty() {
        let storage: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::new());
        storage.set(keys::CART, "{not json").unwrap();

        let cart = CartStore::new(storage);
        assert!(cart.items().is_empty());
    }

    #[test]
    fn test_product_input_rejects_extra_fields() {
        let result: Result<ProductInput, _> = serde_json::from_value(serde_json::json!({
            "id": 1,
            "title": "Espresso",
            "price": 50_000,
            "discount_percentage": 10,
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_image_is_carried_onto_the_line() {
        let cart = empty_cart();
        cart.add_item(&ProductInput {
            image: Some("/media/espresso.jpg".to_string()),
            ..product(1, "Espresso", 50_000)
        });
        assert_eq!(
            cart.items().first().unwrap().image.as_deref(),
            Some("/media/espresso.jpg")
        );
    }
}
