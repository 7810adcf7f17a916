//! Shop route handlers.

use axum::{
    Json,
    extract::{Path, State},
};

use multiverse_core::{Category, Shop, ShopId};

use super::load_shop;
use crate::error::Result;
use crate::state::AppState;

/// List every shop.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Shop>>> {
    Ok(Json(state.store().list_shops().await?))
}

pub async fn show(
    State(state): State<AppState>,
    Path(shop_id): Path<ShopId>,
) -> Result<Json<Shop>> {
    Ok(Json(load_shop(&state, shop_id).await?))
}

/// List the categories of a shop.
pub async fn categories(
    State(state): State<AppState>,
    Path(shop_id): Path<ShopId>,
) -> Result<Json<Vec<Category>>> {
    let shop = load_shop(&state, shop_id).await?;
    Ok(Json(state.store().list_categories(shop.id).await?))
}
