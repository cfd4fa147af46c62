use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::price::Price;
use crate::domain::product::Product;

/// Cache and wire representation of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDto {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub currency: String,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,
}

impl From<&Product> for ProductDto {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            sku: product.sku.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            currency: product.currency.clone(),
            is_active: product.is_active,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// One served page of search results; also the exact payload cached under
/// the search key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub items: Vec<ProductDto>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
}

/// Read result annotated with whether it was served from cache.
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<T> {
    pub value: T,
    pub cache_hit: bool,
}

impl<T> Cached<T> {
    pub fn hit(value: T) -> Self {
        Self {
            value,
            cache_hit: true,
        }
    }

    pub fn miss(value: T) -> Self {
        Self {
            value,
            cache_hit: false,
        }
    }
}
