//! End-to-end tests for the AFROVIBZ storefront.
//!
//! Each test spawns the full application router on an ephemeral port and
//! talks to it over HTTP with a cookie-carrying `reqwest` client, so the
//! session middleware, extractors and JSON error bodies are exercised
//! exactly as a browser or mobile client would see them.
//!
//! ```bash
//! cargo test -p afrovibz-integration-tests
//! ```

#![allow(clippy::missing_panics_doc)]

use std::net::SocketAddr;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use afrovibz_storefront::config::StorefrontConfig;
use afrovibz_storefront::services::auth::{
    DEMO_ADMIN_EMAIL, DEMO_ADMIN_PASSWORD, DEMO_CUSTOMER_EMAIL, DEMO_CUSTOMER_PASSWORD,
};
use afrovibz_storefront::state::AppState;

/// A running storefront plus a client holding one visitor's session.
pub struct TestApp {
    pub base_url: String,
    pub client: Client,
    pub state: AppState,
}

impl TestApp {
    /// Spawn a storefront with the demo catalog and accounts.
    pub async fn spawn() -> Self {
        Self::spawn_with(StorefrontConfig {
            auth_rate_limit: false,
            ..StorefrontConfig::default()
        })
        .await
    }

    /// Spawn a storefront with a custom configuration.
    pub async fn spawn_with(config: StorefrontConfig) -> Self {
        let state = AppState::new(config)
            .await
            .expect("Failed to build application state");
        let app = afrovibz_storefront::app(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("Test server failed");
        });

        Self {
            base_url: format!("http://{addr}"),
            client: visitor(),
            state,
        }
    }

    /// Absolute URL for a path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// A fresh visitor with an empty cookie jar.
    #[must_use]
    pub fn new_visitor(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            client: visitor(),
            state: self.state.clone(),
        }
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(self.url(path))
    }

    pub fn patch(&self, path: &str) -> RequestBuilder {
        self.client.patch(self.url(path))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path))
    }

    /// Log in, keeping the session cookie, and return the bearer token.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let resp = self
            .post("/api/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Login request failed");
        assert_eq!(resp.status(), StatusCode::OK, "login as {email} failed");
        let body = json_body(resp).await;
        body["token"]
            .as_str()
            .expect("Login response has no token")
            .to_string()
    }

    pub async fn login_customer(&self) -> String {
        self.login(DEMO_CUSTOMER_EMAIL, DEMO_CUSTOMER_PASSWORD).await
    }

    pub async fn login_admin(&self) -> String {
        self.login(DEMO_ADMIN_EMAIL, DEMO_ADMIN_PASSWORD).await
    }

    /// Add a product variant to this visitor's cart.
    pub async fn add_to_cart(&self, body: Value) -> Response {
        self.post("/api/cart/items")
            .json(&body)
            .send()
            .await
            .expect("Add to cart request failed")
    }

    /// Current stock of a product, read straight from the repository.
    pub async fn stock_of(&self, id: u32) -> u32 {
        let product = self
            .state
            .products()
            .get(afrovibz_core::ProductId::new(id))
            .await
            .expect("Product missing from catalog");
        product.stock
    }

    /// Id of the signed-in user's first saved address.
    pub async fn first_address_id(&self) -> u64 {
        let resp = self
            .get("/api/account/addresses")
            .send()
            .await
            .expect("Address request failed");
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        body[0]["id"].as_u64().expect("No saved address")
    }
}

fn visitor() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Parse a response body as JSON.
pub async fn json_body(resp: Response) -> Value {
    resp.json().await.expect("Response body is not JSON")
}

/// The machine-readable code of a JSON error response.
pub async fn error_code(resp: Response) -> String {
    let body = json_body(resp).await;
    body["error"]["code"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

/// Parse a decimal amount serialized as a string.
#[must_use]
pub fn money(value: &Value) -> rust_decimal::Decimal {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| panic!("not a decimal string: {value}"))
}
