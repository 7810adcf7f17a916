//! Attribute schema lookup, used by the admin UI to render product forms.

use axum::{Json, extract::Path};

use multiverse_core::{AttributeSchema, ShopType, schema_for};

use crate::error::{AppError, Result};

pub async fn show(Path(shop_type): Path<String>) -> Result<Json<&'static AttributeSchema>> {
    schema_for(ShopType::from(shop_type.as_str()))
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("schema for shop type `{shop_type}`")))
}
