//! Cart API.
//!
//! The cart lives in the visitor's session and is re-checked against the
//! catalog whenever it is read.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use afrovibz_core::ProductId;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{load_cart, store_cart};
use crate::services::cart::{Cart, CartLine, CartSummary, LineKey};
use crate::state::AppState;

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

const fn default_quantity() -> u32 {
    1
}

/// Quantity update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

/// Add-to-cart response.
#[derive(Debug, Serialize)]
pub struct AddItemResponse {
    pub line: CartLine,
    /// The requested quantity was reduced to what is in stock.
    pub capped: bool,
    pub cart: CartSummary,
}

/// Cart badge count.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u32,
}

/// Load the session cart and reconcile it with the catalog.
pub(crate) async fn current_cart(state: &AppState, session: &Session) -> Result<Cart> {
    let mut cart = load_cart(session).await?;
    let changed = state
        .products()
        .with_products(|products| cart.reprice(products))
        .await;
    if changed {
        tracing::debug!("Cart repriced against catalog");
        store_cart(session, &cart).await?;
    }
    Ok(cart)
}

/// Show the cart.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartSummary>> {
    let cart = current_cart(&state, &session).await?;
    Ok(Json(cart.summary(state.config().currency)))
}

/// Add a product to the cart, merging with an existing line for the same
/// variant.
#[instrument(skip(state, session, request), fields(product_id = %request.product_id, quantity = request.quantity))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<AddItemResponse>)> {
    let product = state
        .products()
        .get(request.product_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("product {} not found", request.product_id)))?;

    let mut cart = current_cart(&state, &session).await?;
    let added = cart.add(
        &product,
        request.quantity,
        request.size.as_deref(),
        request.color.as_deref(),
    )?;
    store_cart(&session, &cart).await?;

    let product_id = product.id.to_string();
    let quantity = added.line.quantity.to_string();
    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[
            ("product_id", product_id.as_str()),
            ("quantity", quantity.as_str()),
        ]),
    );

    Ok((
        StatusCode::CREATED,
        Json(AddItemResponse {
            line: added.line,
            capped: added.capped,
            cart: cart.summary(state.config().currency),
        }),
    ))
}

/// Set a line's quantity. Zero removes the line.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(key): Path<String>,
    Json(request): Json<UpdateItemRequest>,
) -> Result<Json<CartSummary>> {
    let key: LineKey = key.parse()?;
    let stock = state
        .products()
        .get(key.product_id)
        .await
        .map_or(0, |p| p.stock);

    let mut cart = current_cart(&state, &session).await?;
    cart.update(&key, request.quantity, stock)?;
    store_cart(&session, &cart).await?;

    Ok(Json(cart.summary(state.config().currency)))
}

/// Remove a line.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Path(key): Path<String>,
) -> Result<Json<CartSummary>> {
    let key: LineKey = key.parse()?;

    let mut cart = current_cart(&state, &session).await?;
    cart.remove(&key)?;
    store_cart(&session, &cart).await?;

    let line = key.to_string();
    add_breadcrumb("cart", "Removed from cart", Some(&[("line", line.as_str())]));
    Ok(Json(cart.summary(state.config().currency)))
}

/// Empty the cart.
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Json<CartSummary>> {
    let cart = Cart::default();
    store_cart(&session, &cart).await?;
    Ok(Json(cart.summary(state.config().currency)))
}

/// Total units in the cart.
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Result<Json<CountResponse>> {
    let cart = current_cart(&state, &session).await?;
    Ok(Json(CountResponse {
        count: cart.item_count(),
    }))
}
