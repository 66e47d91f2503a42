//! Product repository.

use std::collections::BTreeMap;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::instrument;

use afrovibz_core::{ProductId, ProductStatus};

use super::RepositoryError;
use crate::models::product::slugify;
use crate::models::{NewProduct, Product, ProductUpdate};

/// Repository for the product catalog and stock levels.
pub struct ProductRepository {
    table: RwLock<ProductTable>,
}

struct ProductTable {
    products: Vec<Product>,
    next_id: ProductId,
}

impl ProductTable {
    fn position(&self, id: ProductId) -> Result<usize, RepositoryError> {
        self.products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| RepositoryError::NotFound(format!("product {id}")))
    }

    fn unique_slug(&self, base: &str, id: ProductId) -> String {
        if self.products.iter().any(|p| p.slug == base && p.id != id) {
            format!("{base}-{id}")
        } else {
            base.to_string()
        }
    }
}

impl ProductRepository {
    /// Create a repository holding `products`.
    ///
    /// New IDs continue after the highest seeded ID.
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        let next_id = products
            .iter()
            .map(|p| p.id)
            .max()
            .map_or(ProductId::new(1), |id| id.next());

        Self {
            table: RwLock::new(ProductTable { products, next_id }),
        }
    }

    /// Get a product by ID, regardless of status.
    pub async fn get(&self, id: ProductId) -> Option<Product> {
        let table = self.table.read().await;
        table.products.iter().find(|p| p.id == id).cloned()
    }

    /// Run `f` against the full product list under a read lock.
    pub async fn with_products<R>(&self, f: impl FnOnce(&[Product]) -> R) -> R {
        let table = self.table.read().await;
        f(&table.products)
    }

    /// Number of products in the catalog.
    pub async fn count(&self) -> usize {
        self.table.read().await.products.len()
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if the input is invalid.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: NewProduct) -> Result<Product, RepositoryError> {
        input.validate().map_err(RepositoryError::Validation)?;

        let mut table = self.table.write().await;
        let id = table.next_id;
        let slug = table.unique_slug(&slugify(&input.name), id);

        let product = Product {
            id,
            name: input.name.trim().to_string(),
            slug,
            description: input.description,
            category: input.category,
            subcategory: input.subcategory.trim().to_lowercase(),
            brand: input.brand.trim().to_string(),
            price: input.price,
            compare_at_price: input.compare_at_price,
            images: input.images,
            sizes: input.sizes,
            colors: input.colors,
            stock: input.stock,
            rating: 0.0,
            review_count: 0,
            tags: input.tags,
            featured: input.featured,
            status: input.status,
            created_at: Utc::now(),
        };

        table.products.push(product.clone());
        table.next_id = id.next();
        tracing::info!(product_id = %id, "Product created");
        Ok(product)
    }

    /// Apply a partial update to a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Validation` if the result would be invalid.
    #[instrument(skip(self, update))]
    pub async fn update(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        let mut table = self.table.write().await;
        let index = table.position(id)?;
        let current = table
            .products
            .get(index)
            .ok_or_else(|| RepositoryError::NotFound(format!("product {id}")))?;

        let mut updated = update.apply(current).map_err(RepositoryError::Validation)?;
        updated.slug = table.unique_slug(&updated.slug, id);

        if let Some(slot) = table.products.get_mut(index) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    /// Change a product's visibility.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    #[instrument(skip(self))]
    pub async fn set_status(
        &self,
        id: ProductId,
        status: ProductStatus,
    ) -> Result<Product, RepositoryError> {
        let mut table = self.table.write().await;
        let product = table
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| RepositoryError::NotFound(format!("product {id}")))?;

        product.status = status;
        tracing::info!(product_id = %id, %status, "Product status changed");
        Ok(product.clone())
    }

    /// Remove a product from the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<Product, RepositoryError> {
        let mut table = self.table.write().await;
        let index = table.position(id)?;
        Ok(table.products.remove(index))
    }

    /// Decrement stock for every `(product, quantity)` pair, or none of them.
    ///
    /// Quantities for the same product are summed before checking. Only
    /// active products can be reserved. Returns the reserved products as
    /// they stood under the write lock, so callers price from the same
    /// snapshot the stock came from.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Unavailable` if a product is missing or not active.
    /// Returns `RepositoryError::InsufficientStock` if any product is short.
    #[instrument(skip(self, items), fields(lines = items.len()))]
    pub async fn reserve_stock(
        &self,
        items: &[(ProductId, u32)],
    ) -> Result<Vec<Product>, RepositoryError> {
        let wanted = aggregate(items);
        let mut table = self.table.write().await;

        for (&product_id, &requested) in &wanted {
            let product = table
                .products
                .iter()
                .find(|p| p.id == product_id && p.is_visible())
                .ok_or(RepositoryError::Unavailable(product_id))?;

            if product.stock < requested {
                return Err(RepositoryError::InsufficientStock {
                    product_id,
                    requested,
                    available: product.stock,
                });
            }
        }

        let mut reserved = Vec::with_capacity(wanted.len());
        for product in &mut table.products {
            if let Some(&requested) = wanted.get(&product.id) {
                product.stock -= requested;
                reserved.push(product.clone());
            }
        }
        Ok(reserved)
    }

    /// Return previously reserved units to stock.
    ///
    /// Products deleted since the reservation are skipped.
    #[instrument(skip(self, items), fields(lines = items.len()))]
    pub async fn release_stock(&self, items: &[(ProductId, u32)]) {
        let returned = aggregate(items);
        let mut table = self.table.write().await;
        for product in &mut table.products {
            if let Some(&quantity) = returned.get(&product.id) {
                product.stock = product.stock.saturating_add(quantity);
            }
        }
    }
}

fn aggregate(items: &[(ProductId, u32)]) -> BTreeMap<ProductId, u32> {
    let mut totals = BTreeMap::new();
    for &(product_id, quantity) in items {
        let entry = totals.entry(product_id).or_insert(0u32);
        *entry = entry.saturating_add(quantity);
    }
    totals
}
