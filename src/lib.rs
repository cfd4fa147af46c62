//! Cache-coherent product catalog core.
//!
//! Commands and queries for a single product aggregate run through
//! [`application::catalog::CatalogService`]: point lookups and searches are
//! read-through cached, mutations commit to the durable store first and then
//! invalidate by deleting the product's point key and bumping the search
//! version token. Store and cache backends sit behind traits; Postgres,
//! Redis, and in-process implementations ship in [`infra`] and [`cache`].

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
