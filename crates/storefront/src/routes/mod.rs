//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                              - Liveness
//! GET    /health/ready                        - Readiness (catalog loaded)
//!
//! # Products
//! GET    /api/products                        - Listing (filters, sort, paging)
//! GET    /api/products/facets                 - Filter facets
//! GET    /api/products/{id}                   - Detail with related products
//! POST   /api/products                        - Create (admin)
//! PUT    /api/products/{id}                   - Update (admin)
//! DELETE /api/products/{id}                   - Delete (admin)
//! PATCH  /api/products/{id}/status            - Set status (admin)
//!
//! # Cart (session)
//! GET    /api/cart                            - Cart summary
//! DELETE /api/cart                            - Clear
//! POST   /api/cart/items                      - Add, merging by line key
//! PATCH  /api/cart/items/{key}                - Set quantity (0 removes)
//! DELETE /api/cart/items/{key}                - Remove line
//! GET    /api/cart/count                      - Item count
//!
//! # Wishlist (session)
//! GET    /api/wishlist                        - Hydrated wishlist
//! POST   /api/wishlist/{product_id}           - Add
//! DELETE /api/wishlist/{product_id}           - Remove
//! POST   /api/wishlist/{product_id}/toggle    - Toggle
//! POST   /api/wishlist/{product_id}/move-to-cart
//!
//! # Checkout
//! GET    /api/checkout/delivery-options       - Options priced for the cart
//! POST   /api/checkout/quote                  - Totals for a delivery method
//! POST   /api/checkout                        - Place order (auth)
//!
//! # Auth (rate limited)
//! POST   /api/auth/login
//! POST   /api/auth/register
//! POST   /api/auth/logout
//! GET    /api/auth/me                         - Current user (auth)
//!
//! # Account (auth)
//! GET    /api/account/orders
//! GET    /api/account/orders/{id}
//! GET    /api/account/addresses
//! POST   /api/account/addresses
//! DELETE /api/account/addresses/{id}
//! POST   /api/account/addresses/{id}/default
//!
//! # Admin (admin)
//! GET    /api/admin/dashboard
//! GET    /api/admin/products                  - All statuses
//! GET    /api/admin/orders
//! PATCH  /api/admin/orders/{id}/status
//! GET    /api/admin/users
//!
//! # Invoices (owner or admin)
//! GET    /api/invoices/{id}/download
//! ```

pub mod api;
pub mod health;

use axum::{Router, routing::get};

use crate::config::StorefrontConfig;
use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create all routes for the storefront.
pub fn routes(config: &StorefrontConfig) -> Router<AppState> {
    let auth = if config.auth_rate_limit {
        api::auth_routes().layer(auth_rate_limiter())
    } else {
        api::auth_routes()
    };

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/products", api::product_routes())
        .nest("/api/cart", api::cart_routes())
        .nest("/api/wishlist", api::wishlist_routes())
        .nest("/api/checkout", api::checkout_routes())
        .nest("/api/auth", auth)
        .nest("/api/account", api::account_routes())
        .nest("/api/admin", api::admin_routes())
        .nest("/api/invoices", api::invoice_routes())
}
