//! Catalog collaborator interface and in-memory implementation.
//!
//! The engine only ever needs two lookups from the product catalog:
//! active products per category and single products by id. Backends
//! implement [`CatalogReader`]; the in-memory index here backs tests
//! and the demo binary.

use crate::error::Result;
use crate::types::{CategoryId, Product, ProductId};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Read-only view of the product catalog.
pub trait CatalogReader: Send + Sync {
    /// Active products in one category, ascending id order
    fn get_active_products_by_category(&self, category_id: CategoryId) -> Result<Vec<Product>>;

    /// Look up one product by id
    fn get_product(&self, product_id: ProductId) -> Result<Option<Product>>;
}

#[derive(Debug, Default)]
struct CatalogInner {
    products: HashMap<ProductId, Product>,
    /// Product ids per category, ascending
    category_index: HashMap<CategoryId, Vec<ProductId>>,
}

/// In-memory catalog index.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    inner: RwLock<CatalogInner>,
}

impl InMemoryCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a product, keeping the category index current
    pub fn insert_product(&self, product: Product) {
        let mut inner = self.inner.write();
        if let Some(previous) = inner.products.get(&product.id).cloned()
            && previous.category_id != product.category_id
            && let Some(ids) = inner.category_index.get_mut(&previous.category_id)
        {
            ids.retain(|&id| id != product.id);
        }
        let ids = inner.category_index.entry(product.category_id).or_default();
        if let Err(pos) = ids.binary_search(&product.id) {
            ids.insert(pos, product.id);
        }
        inner.products.insert(product.id, product);
    }

    /// Number of products in the catalog
    pub fn len(&self) -> usize {
        self.inner.read().products.len()
    }

    /// Whether the catalog holds no products
    pub fn is_empty(&self) -> bool {
        self.inner.read().products.is_empty()
    }
}

impl CatalogReader for InMemoryCatalog {
    fn get_active_products_by_category(&self, category_id: CategoryId) -> Result<Vec<Product>> {
        let inner = self.inner.read();
        let products = inner
            .category_index
            .get(&category_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.products.get(id))
                    .filter(|p| p.is_active)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(products)
    }

    fn get_product(&self, product_id: ProductId) -> Result<Option<Product>> {
        Ok(self.inner.read().products.get(&product_id).cloned())
    }
}
