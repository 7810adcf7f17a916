//! Product route handlers.
//!
//! Listing runs the two-stage filter: the structured stage is pushed to the
//! store, the attribute stage runs here. Writes go through the core write
//! path before reaching the store.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};

use multiverse_core::{
    FilterQuery, NewProduct, ProductId, ProductListing, ProductPatch, ProductView, ShopId,
};

use super::load_shop;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// List a shop's products matching the query.
#[tracing::instrument(skip_all, fields(shop_id = %shop_id))]
pub async fn list(
    State(state): State<AppState>,
    Path(shop_id): Path<ShopId>,
    query: std::result::Result<Query<FilterQuery>, QueryRejection>,
) -> Result<Json<ProductListing>> {
    let Query(query) = query?;
    let shop = load_shop(&state, shop_id).await?;

    let (structured, attributes) = query.into_parts(shop.shop_type);
    let records = state.store().list_products(shop.id, &structured).await?;
    let records = attributes.apply(shop.shop_type, records);
    tracing::debug!(matched = records.len(), "Filtered product listing");

    Ok(Json(ProductListing::new(&shop, records)))
}

/// Create a product in a shop.
#[tracing::instrument(skip_all, fields(shop_id = %shop_id))]
pub async fn create(
    State(state): State<AppState>,
    Path(shop_id): Path<ShopId>,
    payload: std::result::Result<Json<NewProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductView>)> {
    let Json(product) = payload?;
    let shop = load_shop(&state, shop_id).await?;
    let category = state.store().get_category(product.category_id).await?;

    let validated = product.validate(&shop, category.as_ref())?;
    let record = state.store().create_product(&validated).await?;
    tracing::info!(product_id = %record.id, "Product created");

    Ok((StatusCode::CREATED, Json(record.into())))
}

pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductView>> {
    let record = state
        .store()
        .get_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    Ok(Json(record.into()))
}

/// Apply a partial update to a product.
#[tracing::instrument(skip_all, fields(product_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    payload: std::result::Result<Json<ProductPatch>, JsonRejection>,
) -> Result<Json<ProductView>> {
    let Json(patch) = payload?;
    let existing = state
        .store()
        .get_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    let shop = load_shop(&state, existing.shop_id).await?;

    let category = match patch.category_id {
        Some(category_id) if category_id != existing.category_id => {
            state.store().get_category(category_id).await?
        }
        _ => None,
    };

    let validated = patch.apply(&existing, &shop, category.as_ref())?;
    let record = state.store().update_product(id, &validated).await?;
    tracing::info!("Product updated");

    Ok(Json(record.into()))
}

/// Hard-delete a product.
#[tracing::instrument(skip_all, fields(product_id = %id))]
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    state.store().delete_product(id).await.map_err(|e| match e {
        crate::db::RepositoryError::NotFound => AppError::NotFound(format!("product {id}")),
        other => other.into(),
    })?;
    tracing::info!("Product deleted");
    Ok(StatusCode::NO_CONTENT)
}
