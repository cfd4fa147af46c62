use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::price::Price;

/// The product aggregate.
///
/// New aggregates come from [`Product::create`]; stores rebuild persisted
/// ones field for field. Products are never hard-deleted: retirement flips
/// `is_active` off and the row stays addressable.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    /// Unique, immutable after creation.
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    /// Three-letter uppercase code.
    pub currency: String,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,
}

/// Event value handed back by [`Product::create`] alongside the aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCreated {
    pub product_id: Uuid,
    pub sku: String,
    pub occurred_at: OffsetDateTime,
}

impl Product {
    /// Builds a new active product, normalizing its text fields.
    pub fn create(
        sku: &str,
        name: &str,
        description: Option<&str>,
        price: Price,
        currency: &str,
    ) -> (Self, ProductCreated) {
        let created_at = OffsetDateTime::now_utc();
        let product = Self {
            id: Uuid::new_v4(),
            sku: sku.trim().to_string(),
            name: name.trim().to_string(),
            description: normalize_description(description),
            price,
            currency: currency.trim().to_uppercase(),
            is_active: true,
            created_at,
            updated_at: None,
        };
        let event = ProductCreated {
            product_id: product.id,
            sku: product.sku.clone(),
            occurred_at: created_at,
        };
        (product, event)
    }

    /// Replaces the editable fields and stamps `updated_at`. The SKU is not
    /// editable.
    pub fn update(&mut self, name: &str, description: Option<&str>, price: Price, currency: &str) {
        self.name = name.trim().to_string();
        self.description = normalize_description(description);
        self.price = price;
        self.currency = currency.trim().to_uppercase();
        self.updated_at = Some(OffsetDateTime::now_utc());
    }

    /// Retires the product. Returns `false` when it was already inactive, in
    /// which case nothing changes, `updated_at` included.
    pub fn deactivate(&mut self) -> bool {
        if !self.is_active {
            return false;
        }
        self.is_active = false;
        self.updated_at = Some(OffsetDateTime::now_utc());
        true
    }
}

fn normalize_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}
