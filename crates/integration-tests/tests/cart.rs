//! Session cart and wishlist behaviour over HTTP.

#![allow(clippy::unwrap_used)]

use afrovibz_integration_tests::{TestApp, error_code, json_body, money};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::json;

async fn cart_count(app: &TestApp) -> u64 {
    let body = json_body(app.get("/api/cart/count").send().await.unwrap()).await;
    body["count"].as_u64().unwrap()
}

#[tokio::test]
async fn test_new_visitor_has_empty_cart() {
    let app = TestApp::spawn().await;

    let cart = json_body(app.get("/api/cart").send().await.unwrap()).await;
    assert_eq!(cart["item_count"], 0);
    assert!(cart["items"].as_array().unwrap().is_empty());
    assert_eq!(cart_count(&app).await, 0);
}

#[tokio::test]
async fn test_add_updates_count_and_subtotal() {
    let app = TestApp::spawn().await;

    let resp = app
        .add_to_cart(json!({ "product_id": 2, "quantity": 2, "size": "M" }))
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = json_body(resp).await;
    assert_eq!(body["capped"], false);
    assert_eq!(body["line"]["color"], "Gold");

    let resp = app.add_to_cart(json!({ "product_id": 7 })).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    assert_eq!(cart_count(&app).await, 3);
    let cart = json_body(app.get("/api/cart").send().await.unwrap()).await;
    assert_eq!(money(&cart["subtotal"]), Decimal::new(26_400, 2));
}

#[tokio::test]
async fn test_same_variant_merges_into_one_line() {
    let app = TestApp::spawn().await;

    app.add_to_cart(json!({ "product_id": 2, "size": "L", "color": "black" }))
        .await;
    app.add_to_cart(json!({ "product_id": 2, "size": "l", "color": "Black" }))
        .await;
    app.add_to_cart(json!({ "product_id": 2, "size": "S", "color": "Black" }))
        .await;

    let cart = json_body(app.get("/api/cart").send().await.unwrap()).await;
    let items = cart["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    let large = items.iter().find(|i| i["key"] == "2:L:Black").unwrap();
    assert_eq!(large["quantity"], 2);
}

#[tokio::test]
async fn test_add_is_capped_at_stock() {
    let app = TestApp::spawn().await;

    let resp = app
        .add_to_cart(json!({ "product_id": 2, "quantity": 5, "size": "M" }))
        .await;
    assert_eq!(json_body(resp).await["capped"], false);

    let resp = app
        .add_to_cart(json!({ "product_id": 2, "quantity": 5, "size": "M" }))
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = json_body(resp).await;
    assert_eq!(body["capped"], true);
    assert_eq!(body["line"]["quantity"], 7);

    let resp = app
        .add_to_cart(json!({ "product_id": 2, "size": "M" }))
        .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(error_code(resp).await, "STOCK_LIMIT");
}

#[tokio::test]
async fn test_sizes_of_one_product_share_its_stock() {
    let app = TestApp::spawn().await;

    app.add_to_cart(json!({ "product_id": 2, "quantity": 5, "size": "M" }))
        .await;
    let resp = app
        .add_to_cart(json!({ "product_id": 2, "quantity": 5, "size": "L" }))
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = json_body(resp).await;
    assert_eq!(body["capped"], true);
    assert_eq!(body["line"]["quantity"], 2);
    assert_eq!(cart_count(&app).await, 7);

    let resp = app
        .add_to_cart(json!({ "product_id": 2, "size": "S" }))
        .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(error_code(resp).await, "STOCK_LIMIT");

    let resp = app
        .patch("/api/cart/items/2:L:Gold")
        .json(&json!({ "quantity": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(cart_count(&app).await, 7);
}

#[tokio::test]
async fn test_cart_drops_sizes_no_longer_offered() {
    let app = TestApp::spawn().await;
    app.add_to_cart(json!({ "product_id": 2, "size": "M" }))
        .await;
    app.add_to_cart(json!({ "product_id": 2, "size": "XL" }))
        .await;

    let admin = app.new_visitor();
    admin.login_admin().await;
    let resp = admin
        .put("/api/products/2")
        .json(&json!({ "sizes": ["S", "M", "L"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let cart = json_body(app.get("/api/cart").send().await.unwrap()).await;
    let items = cart["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["key"], "2:M:Gold");
}

#[tokio::test]
async fn test_add_rejects_unavailable_products() {
    let app = TestApp::spawn().await;

    let resp = app
        .add_to_cart(json!({ "product_id": 6, "size": "42" }))
        .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(error_code(resp).await, "OUT_OF_STOCK");

    let resp = app.add_to_cart(json!({ "product_id": 8 })).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(error_code(resp).await, "PRODUCT_UNAVAILABLE");

    let resp = app.add_to_cart(json!({ "product_id": 999 })).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app.add_to_cart(json!({ "product_id": 2 })).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "size is required");

    assert_eq!(cart_count(&app).await, 0);
}

#[tokio::test]
async fn test_update_quantity_and_zero_removes() {
    let app = TestApp::spawn().await;
    app.add_to_cart(json!({ "product_id": 7, "quantity": 2 }))
        .await;
    app.add_to_cart(json!({ "product_id": 12 })).await;

    let resp = app
        .patch("/api/cart/items/7::Natural")
        .json(&json!({ "quantity": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["item_count"], 6);

    let resp = app
        .patch("/api/cart/items/7::Natural")
        .json(&json!({ "quantity": 500 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = app
        .patch("/api/cart/items/7::Natural")
        .json(&json!({ "quantity": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let cart = json_body(resp).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
    assert_eq!(cart["item_count"], 1);
}

#[tokio::test]
async fn test_remove_and_clear() {
    let app = TestApp::spawn().await;
    app.add_to_cart(json!({ "product_id": 7 })).await;
    app.add_to_cart(json!({ "product_id": 9 })).await;

    let resp = app
        .delete("/api/cart/items/7::Natural")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(cart_count(&app).await, 1);

    let resp = app
        .delete("/api/cart/items/7::Natural")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app.delete("/api/cart").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(cart_count(&app).await, 0);
}

#[tokio::test]
async fn test_carts_are_per_visitor() {
    let app = TestApp::spawn().await;
    let other = app.new_visitor();

    app.add_to_cart(json!({ "product_id": 7, "quantity": 3 }))
        .await;

    assert_eq!(cart_count(&app).await, 3);
    assert_eq!(cart_count(&other).await, 0);
}

#[tokio::test]
async fn test_cart_survives_login() {
    let app = TestApp::spawn().await;
    app.add_to_cart(json!({ "product_id": 7, "quantity": 2 }))
        .await;

    app.login_customer().await;

    assert_eq!(cart_count(&app).await, 2);
}

#[tokio::test]
async fn test_cart_drops_products_taken_off_sale() {
    let app = TestApp::spawn().await;
    app.add_to_cart(json!({ "product_id": 7 })).await;
    app.add_to_cart(json!({ "product_id": 9 })).await;

    let admin = app.new_visitor();
    admin.login_admin().await;
    let resp = admin
        .patch("/api/products/9/status")
        .json(&json!({ "status": "archived" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let cart = json_body(app.get("/api/cart").send().await.unwrap()).await;
    let items = cart["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["product_id"], 7);
}

#[tokio::test]
async fn test_wishlist_toggle_twice_restores_membership() {
    let app = TestApp::spawn().await;

    let resp = app.post("/api/wishlist/5/toggle").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["in_wishlist"], true);
    assert_eq!(body["count"], 1);

    let body = json_body(app.post("/api/wishlist/5/toggle").send().await.unwrap()).await;
    assert_eq!(body["in_wishlist"], false);
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_wishlist_add_is_idempotent() {
    let app = TestApp::spawn().await;

    app.post("/api/wishlist/5").send().await.unwrap();
    let body = json_body(app.post("/api/wishlist/5").send().await.unwrap()).await;
    assert_eq!(body["count"], 1);

    let wishlist = json_body(app.get("/api/wishlist").send().await.unwrap()).await;
    assert_eq!(wishlist["count"], 1);
    assert_eq!(wishlist["items"][0]["name"], "Maasai Beaded Sandals");

    let body = json_body(app.delete("/api/wishlist/5").send().await.unwrap()).await;
    assert_eq!(body["in_wishlist"], false);
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_wishlist_rejects_hidden_products() {
    let app = TestApp::spawn().await;

    let resp = app.post("/api/wishlist/8").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_move_to_cart() {
    let app = TestApp::spawn().await;
    app.post("/api/wishlist/9").send().await.unwrap();

    let resp = app
        .post("/api/wishlist/9/move-to-cart")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["wishlist_count"], 0);
    assert_eq!(body["cart"]["item_count"], 1);
    assert_eq!(body["cart"]["items"][0]["key"], "9::Black");

    let resp = app
        .post("/api/wishlist/9/move-to-cart")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
