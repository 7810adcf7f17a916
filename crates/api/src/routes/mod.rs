//! HTTP route handlers for the catalog API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                              - Liveness
//! GET    /health/ready                        - Store connectivity
//!
//! # Shops
//! GET    /api/shops                           - Shop listing
//! GET    /api/shops/{shop_id}                 - Shop detail
//! GET    /api/shops/{shop_id}/categories      - Categories of a shop
//!
//! # Products
//! GET    /api/shops/{shop_id}/products        - Filtered listing
//! POST   /api/shops/{shop_id}/products        - Create (validated)
//! GET    /api/products/{id}                   - Product detail
//! PATCH  /api/products/{id}                   - Partial update (re-validated)
//! DELETE /api/products/{id}                   - Hard delete
//!
//! # Statistics
//! GET    /api/shops/{shop_id}/stats           - Stats over the filtered set
//! GET    /api/universes                       - Cross-universe overview
//!
//! # Schemas
//! GET    /api/shop-types/{shop_type}/schema   - Attribute schema for forms
//! ```

pub mod health;
pub mod products;
pub mod schemas;
pub mod shops;
pub mod stats;

use axum::{Router, routing::get};

use multiverse_core::{CatalogError, Shop, ShopId};

use crate::error::Result;
use crate::state::AppState;

/// Create the catalog API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes())
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shops", get(shops::list))
        .route("/shops/{shop_id}", get(shops::show))
        .route("/shops/{shop_id}/categories", get(shops::categories))
        .route(
            "/shops/{shop_id}/products",
            get(products::list).post(products::create),
        )
        .route("/shops/{shop_id}/stats", get(stats::shop))
        .route(
            "/products/{id}",
            get(products::show)
                .patch(products::update)
                .delete(products::destroy),
        )
        .route("/universes", get(stats::universes))
        .route("/shop-types/{shop_type}/schema", get(schemas::show))
}

/// Look up a shop, failing with `UnknownRelation` when it does not exist.
pub(crate) async fn load_shop(state: &AppState, id: ShopId) -> Result<Shop> {
    state
        .store()
        .get_shop(id)
        .await?
        .ok_or_else(|| {
            CatalogError::UnknownRelation {
                entity: "shop",
                id: id.as_i32(),
            }
            .into()
        })
}
