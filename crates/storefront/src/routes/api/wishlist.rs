//! Wishlist API.
//!
//! The wishlist holds product IDs in the visitor's session; reads hydrate
//! them into products and quietly forget products that no longer exist.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use afrovibz_core::ProductId;

use super::cart::current_cart;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{load_wishlist, store_cart, store_wishlist};
use crate::models::Product;
use crate::services::cart::CartSummary;
use crate::state::AppState;

/// Hydrated wishlist.
#[derive(Debug, Serialize)]
pub struct WishlistView {
    pub items: Vec<Product>,
    pub count: usize,
}

/// Membership after a change.
#[derive(Debug, Serialize)]
pub struct MembershipResponse {
    pub product_id: ProductId,
    pub in_wishlist: bool,
    pub count: usize,
}

/// Result of moving an item to the cart.
#[derive(Debug, Serialize)]
pub struct MoveToCartResponse {
    pub cart: CartSummary,
    pub wishlist_count: usize,
}

async fn visible_product(state: &AppState, id: ProductId) -> Result<Product> {
    state
        .products()
        .get(id)
        .await
        .filter(Product::is_visible)
        .ok_or_else(|| AppError::NotFound(format!("product {id} not found")))
}

/// Show the wishlist.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<WishlistView>> {
    let mut wishlist = load_wishlist(&session).await?;
    let before = wishlist.len();

    let items = state
        .products()
        .with_products(|products| {
            wishlist.retain(|id| products.iter().any(|p| p.id == id));
            wishlist
                .ids()
                .iter()
                .filter_map(|id| products.iter().find(|p| p.id == *id && p.is_visible()))
                .cloned()
                .collect::<Vec<_>>()
        })
        .await;

    if wishlist.len() != before {
        store_wishlist(&session, &wishlist).await?;
    }

    Ok(Json(WishlistView {
        count: items.len(),
        items,
    }))
}

/// Add a product. Adding twice is a no-op.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<Json<MembershipResponse>> {
    visible_product(&state, id).await?;

    let mut wishlist = load_wishlist(&session).await?;
    if wishlist.add(id) {
        store_wishlist(&session, &wishlist).await?;
    }

    Ok(Json(MembershipResponse {
        product_id: id,
        in_wishlist: true,
        count: wishlist.len(),
    }))
}

/// Remove a product. Removing an absent product is a no-op.
#[instrument(skip(session))]
pub async fn remove(session: Session, Path(id): Path<ProductId>) -> Result<Json<MembershipResponse>> {
    let mut wishlist = load_wishlist(&session).await?;
    if wishlist.remove(id) {
        store_wishlist(&session, &wishlist).await?;
    }

    Ok(Json(MembershipResponse {
        product_id: id,
        in_wishlist: false,
        count: wishlist.len(),
    }))
}

/// Flip a product's membership.
#[instrument(skip(state, session))]
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<Json<MembershipResponse>> {
    let mut wishlist = load_wishlist(&session).await?;
    // Removing a product that has since disappeared is still allowed
    if !wishlist.contains(id) {
        visible_product(&state, id).await?;
    }

    let in_wishlist = wishlist.toggle(id);
    store_wishlist(&session, &wishlist).await?;

    Ok(Json(MembershipResponse {
        product_id: id,
        in_wishlist,
        count: wishlist.len(),
    }))
}

/// Move a wishlisted product into the cart.
///
/// Uses the first offered size and color; the product leaves the wishlist
/// only once it is in the cart.
#[instrument(skip(state, session))]
pub async fn move_to_cart(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<Json<MoveToCartResponse>> {
    let mut wishlist = load_wishlist(&session).await?;
    if !wishlist.contains(id) {
        return Err(AppError::NotFound(format!("product {id} is not in the wishlist")));
    }
    let product = visible_product(&state, id).await?;

    let mut cart = current_cart(&state, &session).await?;
    cart.add(
        &product,
        1,
        product.sizes.first().map(String::as_str),
        product.colors.first().map(String::as_str),
    )?;
    wishlist.remove(id);

    store_cart(&session, &cart).await?;
    store_wishlist(&session, &wishlist).await?;

    let product_id = id.to_string();
    add_breadcrumb(
        "wishlist",
        "Moved to cart",
        Some(&[("product_id", product_id.as_str())]),
    );

    Ok(Json(MoveToCartResponse {
        cart: cart.summary(state.config().currency),
        wishlist_count: wishlist.len(),
    }))
}
