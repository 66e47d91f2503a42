//! Admin back-office API.
//!
//! Every handler requires an admin; customers get 403.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use afrovibz_core::{CurrencyCode, OrderId, OrderStatus, ProductId, ProductStatus};

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{Order, Product, User};
use crate::services::catalog::{self, Page, ProductQuery, Visibility};
use crate::state::AppState;

/// Products at or below this stock level are flagged on the dashboard.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// Orders shown in the dashboard's recent list.
const RECENT_ORDERS: usize = 5;

/// A status and how many records have it.
#[derive(Debug, Serialize)]
pub struct StatusCount<S> {
    pub status: S,
    pub count: usize,
}

/// A product running out.
#[derive(Debug, Serialize)]
pub struct LowStockItem {
    pub id: ProductId,
    pub name: String,
    pub stock: u32,
    pub status: ProductStatus,
}

/// Back-office overview.
#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub product_count: usize,
    pub products_by_status: Vec<StatusCount<ProductStatus>>,
    pub low_stock: Vec<LowStockItem>,
    pub order_count: usize,
    pub orders_by_status: Vec<StatusCount<OrderStatus>>,
    /// Total of all orders that were not cancelled.
    pub revenue: Decimal,
    pub currency: CurrencyCode,
    pub customer_count: usize,
    pub recent_orders: Vec<Order>,
}

/// Order listing filter.
#[derive(Debug, Deserialize)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
}

/// Order status change request body.
#[derive(Debug, Deserialize)]
pub struct OrderStatusRequest {
    pub status: OrderStatus,
}

/// Catalog, order and customer overview.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Json<Dashboard> {
    let (product_count, products_by_status, low_stock) = state
        .products()
        .with_products(|products| {
            let by_status = ProductStatus::ALL
                .into_iter()
                .map(|status| StatusCount {
                    status,
                    count: products.iter().filter(|p| p.status == status).count(),
                })
                .collect::<Vec<_>>();

            let mut low_stock: Vec<LowStockItem> = products
                .iter()
                .filter(|p| p.stock <= LOW_STOCK_THRESHOLD)
                .map(|p| LowStockItem {
                    id: p.id,
                    name: p.name.clone(),
                    stock: p.stock,
                    status: p.status,
                })
                .collect();
            low_stock.sort_by_key(|item| (item.stock, item.id));

            (products.len(), by_status, low_stock)
        })
        .await;

    let orders = state.orders().list_all(None).await;
    let orders_by_status = OrderStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: orders.iter().filter(|o| o.status == status).count(),
        })
        .collect();
    let revenue: Decimal = orders
        .iter()
        .filter(|o| o.status.is_billable())
        .map(|o| o.total)
        .sum();

    let customer_count = state
        .accounts()
        .list_users()
        .await
        .iter()
        .filter(|u| !u.role.is_admin())
        .count();

    Json(Dashboard {
        product_count,
        products_by_status,
        low_stock,
        order_count: orders.len(),
        orders_by_status,
        revenue,
        currency: state.config().currency,
        customer_count,
        recent_orders: orders.into_iter().take(RECENT_ORDERS).collect(),
    })
}

/// Products of every status, with the same filters as the public listing.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn products(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<ProductQuery>,
) -> Json<Page<Product>> {
    let page = state
        .products()
        .with_products(|products| catalog::search(products, &query, Visibility::All))
        .await;
    Json(page)
}

/// All orders, newest first, optionally by status.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<OrderQuery>,
) -> Json<Vec<Order>> {
    Json(state.orders().list_all(query.status).await)
}

/// Move an order along its lifecycle.
///
/// Cancelling returns the order's units to stock.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn update_order_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
    Json(request): Json<OrderStatusRequest>,
) -> Result<Json<Order>> {
    let order = state.orders().update_status(id, request.status).await?;

    if order.status == OrderStatus::Cancelled {
        state.products().release_stock(&order.stock_items()).await;
        tracing::info!(order = %order.number, items = order.item_count(), "Cancelled order restocked");
    }

    Ok(Json(order))
}

/// Every registered user.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn users(State(state): State<AppState>, RequireAdmin(admin): RequireAdmin) -> Json<Vec<User>> {
    Json(state.accounts().list_users().await)
}
