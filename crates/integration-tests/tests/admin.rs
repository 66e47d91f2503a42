//! Back-office dashboard, order management and invoice downloads over HTTP.

#![allow(clippy::unwrap_used)]

use afrovibz_integration_tests::{TestApp, error_code, json_body, money};
use reqwest::{StatusCode, header};
use rust_decimal::Decimal;
use serde_json::{Value, json};

/// Log the demo customer in and buy one necklace with standard delivery.
async fn customer_with_order(app: &TestApp) -> Value {
    app.login_customer().await;
    let address_id = app.first_address_id().await;
    app.add_to_cart(json!({ "product_id": 7 })).await;
    let resp = app
        .post("/api/checkout")
        .json(&json!({ "address_id": address_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    json_body(resp).await
}

async fn admin(app: &TestApp) -> TestApp {
    let admin = app.new_visitor();
    admin.login_admin().await;
    admin
}

async fn set_status(admin: &TestApp, id: u64, status: &str) -> reqwest::Response {
    admin
        .patch(&format!("/api/admin/orders/{id}/status"))
        .json(&json!({ "status": status }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_dashboard_on_fresh_store() {
    let app = TestApp::spawn().await;
    let admin = admin(&app).await;

    let body = json_body(admin.get("/api/admin/dashboard").send().await.unwrap()).await;
    assert_eq!(body["product_count"], 16);
    assert_eq!(body["order_count"], 0);
    assert_eq!(body["customer_count"], 1);
    assert_eq!(money(&body["revenue"]), Decimal::ZERO);

    let count_for = |status: &str| {
        body["products_by_status"]
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["status"] == status)
            .map(|s| s["count"].as_u64().unwrap())
            .unwrap()
    };
    assert_eq!(count_for("active"), 14);
    assert_eq!(count_for("draft"), 1);
    assert_eq!(count_for("archived"), 1);

    let low_stock: Vec<_> = body["low_stock"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_u64().unwrap())
        .collect();
    assert_eq!(low_stock, vec![6, 16, 4, 10, 13]);
}

#[tokio::test]
async fn test_dashboard_counts_orders_and_revenue() {
    let app = TestApp::spawn().await;
    let order = customer_with_order(&app).await;
    let admin = admin(&app).await;

    let body = json_body(admin.get("/api/admin/dashboard").send().await.unwrap()).await;
    assert_eq!(body["order_count"], 1);
    assert_eq!(money(&body["revenue"]), money(&order["total"]));
    assert_eq!(body["recent_orders"][0]["number"], order["number"]);
}

#[tokio::test]
async fn test_admin_lists_every_product_and_user() {
    let app = TestApp::spawn().await;
    let admin = admin(&app).await;

    let page = json_body(
        admin
            .get("/api/admin/products?per_page=48")
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(page["total"], 16);

    let drafts = json_body(
        admin
            .get("/api/admin/products?status=draft")
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(drafts["total"], 1);
    assert_eq!(drafts["items"][0]["id"], 8);

    let users = json_body(admin.get("/api/admin/users").send().await.unwrap()).await;
    assert_eq!(users.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_order_lifecycle_and_status_filter() {
    let app = TestApp::spawn().await;
    let order = customer_with_order(&app).await;
    let id = order["id"].as_u64().unwrap();
    let admin = admin(&app).await;

    let resp = set_status(&admin, id, "processing").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["status"], "processing");

    let processing = json_body(
        admin
            .get("/api/admin/orders?status=processing")
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(processing.as_array().unwrap().len(), 1);
    let pending = json_body(
        admin
            .get("/api/admin/orders?status=pending")
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert!(pending.as_array().unwrap().is_empty());

    let resp = set_status(&admin, id, "delivered").await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(error_code(resp).await, "CONFLICT");

    assert_eq!(set_status(&admin, id, "shipped").await.status(), StatusCode::OK);
    let resp = set_status(&admin, id, "cancelled").await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(app.stock_of(7).await, 54);

    let mine = json_body(
        app.get(&format!("/api/account/orders/{id}"))
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(mine["status"], "shipped");
}

#[tokio::test]
async fn test_cancelling_returns_stock() {
    let app = TestApp::spawn().await;
    let order = customer_with_order(&app).await;
    let id = order["id"].as_u64().unwrap();
    assert_eq!(app.stock_of(7).await, 54);

    let admin = admin(&app).await;
    let resp = set_status(&admin, id, "cancelled").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(app.stock_of(7).await, 55);

    let body = json_body(admin.get("/api/admin/dashboard").send().await.unwrap()).await;
    assert_eq!(money(&body["revenue"]), Decimal::ZERO);
}

#[tokio::test]
async fn test_unknown_order_status_update_is_not_found() {
    let app = TestApp::spawn().await;
    let admin = admin(&app).await;

    let resp = set_status(&admin, 42, "processing").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invoice_download() {
    let app = TestApp::spawn().await;
    let order = customer_with_order(&app).await;
    let id = order["id"].as_u64().unwrap();

    let resp = app
        .get(&format!("/api/invoices/{id}/download"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    assert_eq!(
        resp.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"invoice-AFV-000001.txt\""
    );
    let text = resp.text().await.unwrap();
    assert!(text.contains("AFV-000001"));
    assert!(text.contains("Cowrie Shell Statement Necklace"));
    assert!(text.contains("$29.99"));

    let admin = admin(&app).await;
    let resp = admin
        .get(&format!("/api/invoices/{id}/download"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_invoice_is_private_to_its_customer() {
    let app = TestApp::spawn().await;
    let order = customer_with_order(&app).await;
    let id = order["id"].as_u64().unwrap();

    let stranger = app.new_visitor();
    let resp = stranger
        .get(&format!("/api/invoices/{id}/download"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    stranger
        .post("/api/auth/register")
        .json(&json!({
            "email": "kwesi@example.com",
            "password": "anansi-stories",
            "name": "Kwesi Appiah",
        }))
        .send()
        .await
        .unwrap();
    let resp = stranger
        .get(&format!("/api/invoices/{id}/download"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_address_book() {
    let app = TestApp::spawn().await;
    app.login_customer().await;

    let resp = app
        .post("/api/account/addresses")
        .json(&json!({
            "full_name": "Ama Mensah",
            "phone": "+233 20 123 4567",
            "line1": "3 Ring Road",
            "city": "Kumasi",
            "region": "Ashanti",
            "country": "Ghana",
            "make_default": true,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let added = json_body(resp).await;
    assert_eq!(added["is_default"], true);

    let addresses = json_body(app.get("/api/account/addresses").send().await.unwrap()).await;
    let addresses = addresses.as_array().unwrap();
    assert_eq!(addresses.len(), 2);
    assert_eq!(
        addresses.iter().filter(|a| a["is_default"] == true).count(),
        1
    );

    let first = addresses[0]["id"].as_u64().unwrap();
    let resp = app
        .post(&format!("/api/account/addresses/{first}/default"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["is_default"], true);

    let resp = app
        .delete(&format!("/api/account/addresses/{first}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let addresses = json_body(app.get("/api/account/addresses").send().await.unwrap()).await;
    assert_eq!(addresses.as_array().unwrap().len(), 1);
}
