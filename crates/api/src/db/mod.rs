//! Catalog persistence.
//!
//! Handlers talk to a [`CatalogStore`]; two implementations exist:
//!
//! - [`PgCatalogStore`] - `PostgreSQL`, schema `catalog`
//! - [`MemoryCatalogStore`] - in-process, for demos and tests
//!
//! ## Tables
//!
//! - `catalog.shops` - One storefront per row, with its `shop_type`
//! - `catalog.categories` - Categories, owned by a shop
//! - `catalog.products` - Products; `attributes` is opaque JSON text
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p multiverse-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use multiverse_core::{
    Category, CategoryId, NewCategory, NewShop, ProductId, ProductRecord, Shop, ShopId,
    StructuredFilter, ValidatedProduct,
};

pub use memory::MemoryCatalogStore;
pub use postgres::PgCatalogStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., a product pointing at a missing category).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Read and write access to the catalog.
///
/// Stores do no validation of their own: products reach them as
/// [`ValidatedProduct`]s produced by the write path.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    async fn list_shops(&self) -> Result<Vec<Shop>, RepositoryError>;

    async fn get_shop(&self, id: ShopId) -> Result<Option<Shop>, RepositoryError>;

    async fn create_shop(&self, shop: &NewShop) -> Result<Shop, RepositoryError>;

    async fn list_categories(&self, shop_id: ShopId) -> Result<Vec<Category>, RepositoryError>;

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError>;

    async fn create_category(&self, category: &NewCategory) -> Result<Category, RepositoryError>;

    /// Products of a shop matching the structured stage of a filter, in
    /// insertion order.
    async fn list_products(
        &self,
        shop_id: ShopId,
        filter: &StructuredFilter,
    ) -> Result<Vec<ProductRecord>, RepositoryError>;

    /// Every product of every shop, in insertion order.
    async fn list_all_products(&self) -> Result<Vec<ProductRecord>, RepositoryError>;

    async fn get_product(&self, id: ProductId) -> Result<Option<ProductRecord>, RepositoryError>;

    async fn create_product(
        &self,
        product: &ValidatedProduct,
    ) -> Result<ProductRecord, RepositoryError>;

    /// Replace a product's fields.
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    async fn update_product(
        &self,
        id: ProductId,
        product: &ValidatedProduct,
    ) -> Result<ProductRecord, RepositoryError>;

    /// Hard-delete a product.
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
