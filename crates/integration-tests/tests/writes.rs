//! Product writes through the HTTP API: validation, relations, updates.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use serde_json::{Value, json};

use multiverse_integration_tests::{BREWERY, BREWERY_BLONDES, HERB_SHOP, TEA_SHOP, TestContext};

fn blonde(attributes: &Value) -> Value {
    json!({
        "name": "Blonde Test",
        "description": "Pour les tests",
        "price": "4.50",
        "categoryId": BREWERY_BLONDES,
        "attributes": attributes
    })
}

#[tokio::test]
async fn test_create_valid_brewery_product() {
    let ctx = TestContext::new().await;
    let (status, body) = ctx
        .post_json(
            &format!("/api/shops/{BREWERY}/products"),
            &blonde(&json!({
                "degre_alcool": 5.2,
                "amertume_ibu": 25,
                "type_houblon": "Cascade",
                "stock": 50
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 20);
    assert_eq!(body["stockStatus"], "in_stock");
    assert_eq!(body["categoryName"], "Blondes");
    assert_eq!(body["attributes"]["degre_alcool"], 5.2);

    let (status, fetched) = ctx.get("/api/products/20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, body);
}

#[tokio::test]
async fn test_numeric_text_is_normalized_on_write() {
    let ctx = TestContext::new().await;
    let (status, body) = ctx
        .post_json(
            &format!("/api/shops/{BREWERY}/products"),
            &blonde(&json!({"degre_alcool": "5,5", "amertume_ibu": "20", "stock": "3"})),
        )
        .await;

    // A comma is not a decimal separator
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "degre_alcool");

    let (status, body) = ctx
        .post_json(
            &format!("/api/shops/{BREWERY}/products"),
            &blonde(&json!({"degre_alcool": "5.5", "amertume_ibu": "20", "stock": "3"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["attributes"]["amertume_ibu"], 20);
    assert_eq!(body["stockStatus"], "low_stock");
}

#[tokio::test]
async fn test_missing_mandatory_field_is_rejected() {
    let ctx = TestContext::new().await;
    let (status, body) = ctx
        .post_json(
            &format!("/api/shops/{BREWERY}/products"),
            &blonde(&json!({"degre_alcool": 5.2, "stock": 50})),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "amertume_ibu");
    assert_eq!(
        body["error"],
        "missing mandatory field `amertume_ibu` for brewery products"
    );

    let (_, listing) = ctx.get(&format!("/api/shops/{BREWERY}/products")).await;
    assert_eq!(listing["total"], 5);
}

#[tokio::test]
async fn test_negative_stock_is_rejected() {
    let ctx = TestContext::new().await;
    let (status, body) = ctx
        .post_json(
            &format!("/api/shops/{BREWERY}/products"),
            &blonde(&json!({"degre_alcool": 5, "amertume_ibu": 20, "stock": -1})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "stock");
}

#[tokio::test]
async fn test_non_object_attributes_are_malformed() {
    let ctx = TestContext::new().await;
    let (status, body) = ctx
        .post_json(
            &format!("/api/shops/{BREWERY}/products"),
            &blonde(&json!("{invalid")),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("malformed attribute payload")
    );
}

#[tokio::test]
async fn test_structured_fields_are_checked_first() {
    let ctx = TestContext::new().await;

    let mut product = blonde(&json!({}));
    product["price"] = json!("0");
    let (status, body) = ctx
        .post_json(&format!("/api/shops/{BREWERY}/products"), &product)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "price");

    // The price column holds cents only
    let mut product = blonde(&json!({}));
    product["price"] = json!("0.001");
    let (status, body) = ctx
        .post_json(&format!("/api/shops/{BREWERY}/products"), &product)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "price");

    let mut product = blonde(&json!({}));
    product["name"] = json!("   ");
    let (status, body) = ctx
        .post_json(&format!("/api/shops/{BREWERY}/products"), &product)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "name");
}

#[tokio::test]
async fn test_category_must_belong_to_the_shop() {
    let ctx = TestContext::new().await;

    // Category 5 belongs to the tea shop
    let mut product = blonde(&json!({"degre_alcool": 5, "amertume_ibu": 20, "stock": 1}));
    product["categoryId"] = json!(5);
    let (status, body) = ctx
        .post_json(&format!("/api/shops/{BREWERY}/products"), &product)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "category 5 not found");

    product["categoryId"] = json!(404);
    let (status, _) = ctx
        .post_json(&format!("/api/shops/{BREWERY}/products"), &product)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_in_unknown_shop() {
    let ctx = TestContext::new().await;
    let (status, _) = ctx
        .post_json("/api/shops/77/products", &blonde(&json!({})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_body_is_bad_request() {
    let ctx = TestContext::new().await;
    let (status, body) = ctx
        .post_json(
            &format!("/api/shops/{BREWERY}/products"),
            &json!({"name": "Sans prix"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_partial_update_merges_attributes() {
    let ctx = TestContext::new().await;

    // Assam Malty: stock 6
    let (status, body) = ctx
        .patch_json("/api/products/7", &json!({"attributes": {"stock": 0}}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stockStatus"], "out_of_stock");
    assert_eq!(body["attributes"]["origine_plantation"], "Assam, Inde");
    assert_eq!(body["attributes"]["grade_qualite"], "FTGFOP");

    let (status, body) = ctx
        .patch_json("/api/products/7", &json!({"price": "13.00", "name": "Assam Corsé"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], "13.00");
    assert_eq!(body["name"], "Assam Cors\u{e9}");
    assert_eq!(body["attributes"]["stock"], 0);
}

#[tokio::test]
async fn test_update_validates_supplied_fields_only() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .patch_json("/api/products/7", &json!({"attributes": {"stock": -4}}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "stock");

    let (status, body) = ctx
        .patch_json("/api/products/7", &json!({"attributes": {"grade_qualite": ""}}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "grade_qualite");

    let (_, unchanged) = ctx.get("/api/products/7").await;
    assert_eq!(unchanged["attributes"]["stock"], 6);
}

#[tokio::test]
async fn test_update_cannot_blank_an_optional_attribute() {
    let ctx = TestContext::new().await;

    // Blonde du Comptoir is hopped with Cascade
    let (status, body) = ctx
        .patch_json("/api/products/1", &json!({"attributes": {"type_houblon": "   "}}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "type_houblon");

    let (_, unchanged) = ctx.get("/api/products/1").await;
    assert_eq!(unchanged["attributes"]["type_houblon"], "Cascade");
}

#[tokio::test]
async fn test_update_can_move_category_within_shop() {
    let ctx = TestContext::new().await;

    // Sencha (8) from "Thés verts" (6) to "Oolongs" (7)
    let (status, body) = ctx
        .patch_json("/api/products/8", &json!({"categoryId": 7}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["categoryName"], "Oolongs");

    let (status, _) = ctx
        .patch_json("/api/products/8", &json!({"categoryId": BREWERY_BLONDES}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_replaces_malformed_payload() {
    let ctx = TestContext::new().await;
    let id = ctx
        .insert_unchecked(TEA_SHOP, 5, "Vrac ancien", Some("{invalid"))
        .await;

    let (status, body) = ctx
        .patch_json(
            &format!("/api/products/{id}"),
            &json!({"attributes": {"origine_plantation": "Nilgiri", "stock": 3}}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["attributes"],
        json!({"origine_plantation": "Nilgiri", "stock": 3})
    );
    assert_eq!(body["stockStatus"], "low_stock");
}

#[tokio::test]
async fn test_update_unknown_product() {
    let ctx = TestContext::new().await;
    let (status, _) = ctx
        .patch_json("/api/products/999", &json!({"name": "Fantôme"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_product() {
    let ctx = TestContext::new().await;

    assert_eq!(ctx.delete("/api/products/16").await, StatusCode::NO_CONTENT);
    let (status, _) = ctx.get("/api/products/16").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, listing) = ctx.get(&format!("/api/shops/{HERB_SHOP}/products")).await;
    assert_eq!(listing["total"], 3);

    assert_eq!(ctx.delete("/api/products/16").await, StatusCode::NOT_FOUND);
}
