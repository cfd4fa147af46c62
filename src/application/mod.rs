//! Application layer: commands, queries, and the catalog service.

pub mod catalog;
pub mod commands;
pub mod dto;
pub mod error;
pub mod queries;
pub mod store;
pub mod validate;
