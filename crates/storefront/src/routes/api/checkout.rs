//! Checkout API: delivery options, quotes and order placement.

use axum::{Json, extract::State, http::StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use afrovibz_core::CurrencyCode;

use super::cart::current_cart;
use crate::error::Result;
use crate::middleware::{RequireAuth, store_cart};
use crate::models::{DeliveryMethod, Order};
use crate::services::cart::Cart;
use crate::services::checkout::{
    CheckoutError, CheckoutService, DeliveryOption, PlaceOrderRequest, Quote,
};
use crate::state::AppState;

/// Delivery options for the current cart.
#[derive(Debug, Serialize)]
pub struct DeliveryOptionsResponse {
    pub subtotal: Decimal,
    pub currency: CurrencyCode,
    pub options: Vec<DeliveryOption>,
}

/// Quote request body.
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    #[serde(default)]
    pub delivery: DeliveryMethod,
}

/// List delivery methods priced for the current cart.
#[instrument(skip(state, session))]
pub async fn delivery_options(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<DeliveryOptionsResponse>> {
    let cart = current_cart(&state, &session).await?;
    let pricing = state.pricing();
    let subtotal = cart.subtotal();

    Ok(Json(DeliveryOptionsResponse {
        subtotal,
        currency: pricing.currency,
        options: pricing.delivery_options(subtotal),
    }))
}

/// Price the current cart for a delivery method.
#[instrument(skip(state, session))]
pub async fn quote(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<Quote>> {
    let cart = current_cart(&state, &session).await?;
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart.into());
    }
    Ok(Json(state.pricing().quote(cart.subtotal(), request.delivery)))
}

/// Place an order for the current cart and empty it.
#[instrument(skip(state, session, user, request), fields(user_id = %user.id))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let cart = current_cart(&state, &session).await?;

    let order = CheckoutService::new(
        state.products(),
        state.accounts(),
        state.orders(),
        state.pricing(),
    )
    .place_order(&user, &cart, request)
    .await?;

    store_cart(&session, &Cart::default()).await?;

    tracing::info!(
        order = %order.number,
        total = %order.total,
        items = order.item_count(),
        "Order placed"
    );

    Ok((StatusCode::CREATED, Json(order)))
}
