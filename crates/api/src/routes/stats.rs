//! Statistics route handlers.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};

use multiverse_core::{
    FilterQuery, ShopId, StatsReport, UniverseSummary, aggregate, universe_overview,
};

use super::load_shop;
use crate::error::Result;
use crate::state::AppState;

/// Statistics over a shop's products, narrowed by the same query as the
/// listing.
pub async fn shop(
    State(state): State<AppState>,
    Path(shop_id): Path<ShopId>,
    query: std::result::Result<Query<FilterQuery>, QueryRejection>,
) -> Result<Json<StatsReport>> {
    let Query(query) = query?;
    let shop = load_shop(&state, shop_id).await?;

    let (structured, attributes) = query.into_parts(shop.shop_type);
    let records = state.store().list_products(shop.id, &structured).await?;
    let records = attributes.apply(shop.shop_type, records);

    Ok(Json(aggregate(&records, shop.shop_type)))
}

/// Summary of every universe for the admin dashboard.
pub async fn universes(State(state): State<AppState>) -> Result<Json<Vec<UniverseSummary>>> {
    let shops = state.store().list_shops().await?;
    let products = state.store().list_all_products().await?;
    Ok(Json(universe_overview(&shops, &products)))
}
