//! Integration tests for the Multiverse catalog API.
//!
//! The API router is driven in-process with `tower::ServiceExt::oneshot`
//! over an in-memory store seeded with the demo catalog, so no database or
//! running server is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p multiverse-integration-tests
//! ```
//!
//! # Demo Catalog Layout
//!
//! Ids are assigned in seed order:
//!
//! | Shop | Type         | Categories | Products |
//! |------|--------------|------------|----------|
//! | 1    | `brewery`    | 1-4        | 1-5      |
//! | 2    | `teaShop`    | 5-7        | 6-10     |
//! | 3    | `beautyShop` | 8-10       | 11-15    |
//! | 4    | `herbShop`   | 11-13      | 16-19    |

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use multiverse_api::db::MemoryCatalogStore;
use multiverse_api::state::AppState;
use multiverse_core::{CategoryId, Price, ProductId, ShopId, ValidatedProduct};

pub const BREWERY: i32 = 1;
pub const TEA_SHOP: i32 = 2;
pub const BEAUTY_SHOP: i32 = 3;
pub const HERB_SHOP: i32 = 4;

/// Category "Blondes" of the brewery.
pub const BREWERY_BLONDES: i32 = 1;

/// Largest body the helpers will buffer.
const BODY_LIMIT: usize = 1024 * 1024;

/// The API over a freshly seeded in-memory catalog.
pub struct TestContext {
    pub state: AppState,
}

impl TestContext {
    pub async fn new() -> Self {
        let store = MemoryCatalogStore::with_demo_catalog()
            .await
            .expect("Demo catalog should seed");
        Self {
            state: AppState::new(store),
        }
    }

    fn router(&self) -> Router {
        multiverse_api::app(self.state.clone())
    }

    /// Send a request and return the status with the JSON body.
    ///
    /// An empty body reads as `Value::Null`; a non-JSON body as a string.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<&Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router()
            .oneshot(request.body(body).expect("Request should build"))
            .await
            .expect("Router is infallible");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), BODY_LIMIT)
            .await
            .expect("Body should be readable");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn patch_json(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> StatusCode {
        self.send(Method::DELETE, uri, None).await.0
    }

    /// Insert a product directly into the store, bypassing validation.
    ///
    /// Stands in for rows written before attribute validation existed.
    pub async fn insert_unchecked(
        &self,
        shop_id: i32,
        category_id: i32,
        name: &str,
        attributes: Option<&str>,
    ) -> ProductId {
        let product = ValidatedProduct {
            shop_id: ShopId::new(shop_id),
            category_id: CategoryId::new(category_id),
            name: name.to_string(),
            description: None,
            price: Price::new(9.into()).expect("Positive price"),
            image_url: None,
            attributes: attributes.map(str::to_string),
        };
        self.state
            .store()
            .create_product(&product)
            .await
            .expect("Insert should succeed")
            .id
    }
}

/// Names of the products in a listing response, in order.
#[must_use]
pub fn product_names(listing: &Value) -> Vec<String> {
    listing["products"]
        .as_array()
        .map(|products| {
            products
                .iter()
                .filter_map(|p| p["name"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
