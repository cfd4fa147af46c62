//! Catalog failure taxonomy with stable string codes.

use thiserror::Error;
use uuid::Uuid;

use crate::application::store::StoreError;
use crate::application::validate::ValidationErrors;

/// Machine-readable codes, one per [`CatalogError`] variant. Transports key
/// their status mapping off these rather than matching on variants.
pub mod codes {
    pub const VALIDATION_FAILED: &str = "validation.failed";
    pub const NOT_FOUND: &str = "catalog.not_found";
    pub const CONFLICT: &str = "catalog.conflict";
    pub const STORE_UNAVAILABLE: &str = "catalog.store_unavailable";
}

/// Failure of a catalog operation.
///
/// `Validation`, `NotFound`, and `Conflict` are expected outcomes a caller
/// can act on; `Store` means the durable backend stayed unreachable after
/// the adapter's own retrying. Cache trouble never shows up here: handlers
/// log it and degrade instead (see [`crate::application::catalog`]).
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("{message}")]
    NotFound { message: String },
    #[error("{message}")]
    Conflict { message: String },
    #[error("store unavailable: {0}")]
    Store(#[from] StoreError),
}

impl CatalogError {
    pub fn product_not_found(id: Uuid) -> Self {
        Self::NotFound {
            message: format!("Product '{id}' was not found."),
        }
    }

    pub fn sku_conflict(sku: &str) -> Self {
        Self::Conflict {
            message: format!("Product with SKU '{sku}' already exists."),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => codes::VALIDATION_FAILED,
            Self::NotFound { .. } => codes::NOT_FOUND,
            Self::Conflict { .. } => codes::CONFLICT,
            Self::Store(_) => codes::STORE_UNAVAILABLE,
        }
    }
}
