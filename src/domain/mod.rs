//! Domain layer: the product aggregate and its value types.

pub mod price;
pub mod product;
