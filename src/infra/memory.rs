//! In-memory product store for tests and single-process deployments.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::application::store::{
    PageRequest, ProductFilter, ProductPage, ProductStore, StoreError,
};
use crate::domain::product::Product;

/// Keeps every product in process memory. Search mirrors the Postgres
/// store: case-insensitive substring matching over name, description, and
/// SKU, ordered by name with the id as tiebreak.
#[derive(Default)]
pub struct MemoryProductStore {
    products: DashMap<Uuid, Product>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn matches(product: &Product, filter: &ProductFilter) -> bool {
        if let Some(is_active) = filter.is_active {
            if product.is_active != is_active {
                return false;
            }
        }
        if let Some(min) = filter.min_price {
            if product.price < min {
                return false;
            }
        }
        if let Some(max) = filter.max_price {
            if product.price > max {
                return false;
            }
        }
        if let Some(query) = filter.normalized_query() {
            let needle = query.to_lowercase();
            let description = product.description.as_deref().unwrap_or("");
            if !product.name.to_lowercase().contains(&needle)
                && !description.to_lowercase().contains(&needle)
                && !product.sku.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        Ok(self.products.get(&id).map(|entry| entry.value().clone()))
    }

    async fn sku_exists(&self, sku: &str) -> Result<bool, StoreError> {
        Ok(self.products.iter().any(|entry| entry.value().sku == sku))
    }

    async fn insert(&self, product: &Product) -> Result<(), StoreError> {
        if self.sku_exists(&product.sku).await? {
            return Err(StoreError::Duplicate {
                constraint: "products_sku_key".to_string(),
            });
        }
        self.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<(), StoreError> {
        let mut entry = self
            .products
            .get_mut(&product.id)
            .ok_or_else(|| StoreError::from_persistence("update affected no rows"))?;
        let stored = entry.value_mut();
        stored.name = product.name.clone();
        stored.description = product.description.clone();
        stored.price = product.price;
        stored.currency = product.currency.clone();
        stored.updated_at = product.updated_at;
        Ok(())
    }

    async fn deactivate(&self, product: &Product) -> Result<(), StoreError> {
        let mut entry = self
            .products
            .get_mut(&product.id)
            .ok_or_else(|| StoreError::from_persistence("deactivate affected no rows"))?;
        let stored = entry.value_mut();
        stored.is_active = product.is_active;
        stored.updated_at = product.updated_at;
        Ok(())
    }

    async fn search(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<ProductPage, StoreError> {
        let mut matches: Vec<Product> = self
            .products
            .iter()
            .filter(|entry| Self::matches(entry.value(), filter))
            .map(|entry| entry.value().clone())
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        let total_count = matches.len() as u64;
        let items = matches
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();

        Ok(ProductPage { items, total_count })
    }
}
