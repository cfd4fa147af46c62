use uuid::Uuid;

use crate::application::validate::{
    Validate, ValidationErrors, require_max_chars, require_non_empty,
};
use crate::domain::price::Price;

pub const SKU_MAX_CHARS: usize = 32;
pub const NAME_MAX_CHARS: usize = 128;
pub const DESCRIPTION_MAX_CHARS: usize = 2048;

#[derive(Debug, Clone)]
pub struct CreateProduct {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub currency: String,
}

/// SKUs are immutable, so the update command carries none.
#[derive(Debug, Clone)]
pub struct UpdateProduct {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub currency: String,
}

#[derive(Debug, Clone, Copy)]
pub struct DeactivateProduct {
    pub id: Uuid,
}

impl Validate for CreateProduct {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_sku(&mut errors, &self.sku);
        check_editable_fields(
            &mut errors,
            &self.name,
            self.description.as_deref(),
            self.price,
            &self.currency,
        );
        errors.into_result()
    }
}

impl Validate for UpdateProduct {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_editable_fields(
            &mut errors,
            &self.name,
            self.description.as_deref(),
            self.price,
            &self.currency,
        );
        errors.into_result()
    }
}

fn check_sku(errors: &mut ValidationErrors, sku: &str) {
    require_non_empty(errors, "sku", sku);
    require_max_chars(errors, "sku", sku, SKU_MAX_CHARS);
    if !sku.is_empty() && !sku.chars().all(is_sku_char) {
        errors.push(
            "sku",
            "sku may only contain uppercase letters, digits, underscores, and dashes.",
        );
    }
}

fn is_sku_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' || c == '-'
}

fn check_editable_fields(
    errors: &mut ValidationErrors,
    name: &str,
    description: Option<&str>,
    price: Price,
    currency: &str,
) {
    require_non_empty(errors, "name", name);
    require_max_chars(errors, "name", name, NAME_MAX_CHARS);
    if let Some(description) = description {
        require_max_chars(errors, "description", description, DESCRIPTION_MAX_CHARS);
    }
    if !price.is_positive() {
        errors.push("price", "price must be greater than zero.");
    }
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
        errors.push("currency", "currency must be a three-letter uppercase code.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create() -> CreateProduct {
        CreateProduct {
            sku: "SKU-1".to_string(),
            name: "Espresso Cups".to_string(),
            description: Some("Boxed set of six.".to_string()),
            price: Price::from_minor_units(1_100),
            currency: "USD".to_string(),
        }
    }

    #[test]
    fn accepts_a_well_formed_command() {
        assert!(create().validate().is_ok());
    }

    #[test]
    fn accepts_boundary_lengths() {
        let mut command = create();
        command.sku = "S".repeat(32);
        command.name = "n".repeat(128);
        command.description = Some("d".repeat(2048));
        assert!(command.validate().is_ok());
    }

    #[test]
    fn rejects_lowercase_or_oversized_sku() {
        let mut command = create();
        command.sku = "sku-1".to_string();
        assert!(command.validate().unwrap_err().field("sku").is_some());

        let mut command = create();
        command.sku = "S".repeat(33);
        assert!(command.validate().unwrap_err().field("sku").is_some());
    }

    #[test]
    fn rejects_non_positive_price_and_bad_currency() {
        let mut command = create();
        command.price = Price::from_minor_units(0);
        command.currency = "usd".to_string();
        let errors = command.validate().unwrap_err();
        assert!(errors.field("price").is_some());
        assert!(errors.field("currency").is_some());
    }

    #[test]
    fn collects_all_violations_in_one_pass() {
        let command = CreateProduct {
            sku: String::new(),
            name: String::new(),
            description: None,
            price: Price::from_minor_units(-5),
            currency: "US".to_string(),
        };
        let errors = command.validate().unwrap_err();
        assert_eq!(errors.violations().len(), 4);
    }

    #[test]
    fn oversized_description_is_rejected() {
        let mut command = create();
        command.description = Some("d".repeat(2049));
        assert!(command.validate().unwrap_err().field("description").is_some());
    }

    #[test]
    fn update_skips_sku_rules() {
        let command = UpdateProduct {
            id: Uuid::new_v4(),
            name: "Mug".to_string(),
            description: None,
            price: Price::from_minor_units(900),
            currency: "EUR".to_string(),
        };
        assert!(command.validate().is_ok());
    }
}
