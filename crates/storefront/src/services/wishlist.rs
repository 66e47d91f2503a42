//! Wishlist.
//!
//! An ordered, duplicate-free list of product IDs kept in the visitor's
//! session. Hydration into products happens at the route layer, which
//! drops IDs that no longer resolve.

use serde::{Deserialize, Serialize};

use afrovibz_core::ProductId;

/// A visitor's saved products, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wishlist {
    product_ids: Vec<ProductId>,
}

impl Wishlist {
    /// Add a product. Returns `false` if it was already present.
    pub fn add(&mut self, id: ProductId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.product_ids.push(id);
        true
    }

    /// Remove a product. Returns `false` if it was not present.
    pub fn remove(&mut self, id: ProductId) -> bool {
        let before = self.product_ids.len();
        self.product_ids.retain(|&p| p != id);
        self.product_ids.len() != before
    }

    /// Flip membership and return the new state.
    pub fn toggle(&mut self, id: ProductId) -> bool {
        if self.remove(id) {
            false
        } else {
            self.product_ids.push(id);
            true
        }
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.product_ids.contains(&id)
    }

    #[must_use]
    pub fn ids(&self) -> &[ProductId] {
        &self.product_ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.product_ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.product_ids.is_empty()
    }

    /// Keep only IDs accepted by `known`.
    pub fn retain(&mut self, known: impl Fn(ProductId) -> bool) {
        self.product_ids.retain(|&id| known(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut wishlist = Wishlist::default();
        assert!(wishlist.add(ProductId::new(3)));
        assert!(!wishlist.add(ProductId::new(3)));
        assert_eq!(wishlist.len(), 1);
    }

    #[test]
    fn test_toggle_twice_restores() {
        let mut wishlist = Wishlist::default();
        wishlist.add(ProductId::new(1));
        let original = wishlist.clone();

        assert!(wishlist.toggle(ProductId::new(2)));
        assert!(wishlist.contains(ProductId::new(2)));
        assert!(!wishlist.toggle(ProductId::new(2)));
        assert_eq!(wishlist, original);
    }

    #[test]
    fn test_remove_missing() {
        let mut wishlist = Wishlist::default();
        assert!(!wishlist.remove(ProductId::new(9)));
    }

    #[test]
    fn test_keeps_insertion_order() {
        let mut wishlist = Wishlist::default();
        for id in [5, 1, 3] {
            wishlist.add(ProductId::new(id));
        }
        wishlist.retain(|id| id != ProductId::new(1));
        assert_eq!(wishlist.ids(), &[ProductId::new(5), ProductId::new(3)]);
    }

    #[test]
    fn test_serializes_as_array() {
        let mut wishlist = Wishlist::default();
        wishlist.add(ProductId::new(7));
        assert_eq!(serde_json::to_string(&wishlist).unwrap_or_default(), "[7]");
    }
}
