//! Persistence contract the catalog handlers run against.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::price::Price;
use crate::domain::product::Product;

/// Durable-store failure, surfaced after any adapter-level retrying.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("duplicate key violates constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("store operation timed out")]
    Timeout,
}

impl StoreError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Search restriction; `None` fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub is_active: Option<bool>,
    /// Inclusive lower bound.
    pub min_price: Option<Price>,
    /// Inclusive upper bound.
    pub max_price: Option<Price>,
    /// Case-insensitive substring over name, description, and SKU. Stores
    /// match the [`Self::normalized_query`] form, never this raw value.
    pub query: Option<String>,
}

impl ProductFilter {
    /// Free-text query trimmed and with internal whitespace runs collapsed
    /// to single spaces, the same equivalence the search cache key applies.
    /// Requests that share a key must compute identical pages, so every
    /// store matches against this form.
    pub fn normalized_query(&self) -> Option<String> {
        let collapsed = self
            .query
            .as_deref()?
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        (!collapsed.is_empty()).then_some(collapsed)
    }
}

/// 1-based page selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn offset(self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    pub fn limit(self) -> u32 {
        self.page_size
    }
}

/// One page of matches plus the pre-pagination total.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total_count: u64,
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, StoreError>;

    async fn sku_exists(&self, sku: &str) -> Result<bool, StoreError>;

    async fn insert(&self, product: &Product) -> Result<(), StoreError>;

    /// Persists the editable fields (name, description, price, currency,
    /// update stamp) of an existing product, matched by id. SKU and active
    /// flag are left untouched, so a stale aggregate can never reactivate a
    /// concurrently deactivated product.
    async fn update(&self, product: &Product) -> Result<(), StoreError>;

    /// Persists the active flag and update stamp of an existing product,
    /// leaving every other column alone.
    async fn deactivate(&self, product: &Product) -> Result<(), StoreError>;

    /// Filtered page ordered by name (id as tiebreak), plus the total match
    /// count before pagination.
    async fn search(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<ProductPage, StoreError>;
}
