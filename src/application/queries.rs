use uuid::Uuid;

use crate::application::store::{PageRequest, ProductFilter};
use crate::application::validate::{Validate, ValidationErrors};
use crate::domain::price::Price;

pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy)]
pub struct GetProductById {
    pub id: Uuid,
}

/// Paginated catalog search. `None` filters do not constrain; the free-text
/// query matches name, description, and SKU as a case-insensitive substring.
#[derive(Debug, Clone)]
pub struct SearchProducts {
    pub is_active: Option<bool>,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
    pub query: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for SearchProducts {
    fn default() -> Self {
        Self {
            is_active: None,
            min_price: None,
            max_price: None,
            query: None,
            page: 1,
            page_size: 20,
        }
    }
}

impl SearchProducts {
    /// Store-level filter with the free-text query trimmed; a blank query is
    /// no filter at all.
    pub fn filter(&self) -> ProductFilter {
        ProductFilter {
            is_active: self.is_active,
            min_price: self.min_price,
            max_price: self.max_price,
            query: self
                .query
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string),
        }
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

impl Validate for SearchProducts {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.page < 1 {
            errors.push("page", "page must be at least 1.");
        }
        if self.page_size < 1 || self.page_size > MAX_PAGE_SIZE {
            errors.push("page_size", "page_size must be between 1 and 100.");
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                errors.push(
                    "min_price",
                    "min_price must be less than or equal to max_price.",
                );
            }
        }
        errors.into_result()
    }
}
