//! Product catalog API.
//!
//! Public listing and detail, plus admin create/update/delete/status.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use afrovibz_core::{Category, ProductId, ProductStatus};

use crate::error::{AppError, Result};
use crate::middleware::{OptionalAuth, RequireAdmin};
use crate::models::{NewProduct, Product, ProductUpdate};
use crate::services::catalog::{self, Facets, Page, ProductQuery, Visibility};
use crate::state::AppState;

/// Related products shown on a detail response.
const RELATED_LIMIT: usize = 4;

/// Product detail with related products.
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub on_sale: bool,
    pub discount_percent: Option<u32>,
    pub related: Vec<Product>,
}

/// Facet query parameters.
#[derive(Debug, Deserialize)]
pub struct FacetQuery {
    pub category: Option<Category>,
}

/// Status change request body.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: ProductStatus,
}

/// List active products.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Json<Page<Product>> {
    let page = state
        .products()
        .with_products(|products| catalog::search(products, &query, Visibility::Public))
        .await;
    Json(page)
}

/// Filter facets for the active catalog.
#[instrument(skip(state))]
pub async fn facets(
    State(state): State<AppState>,
    Query(query): Query<FacetQuery>,
) -> Json<Facets> {
    let facets = state
        .products()
        .with_products(|products| catalog::facets(products, query.category))
        .await;
    Json(facets)
}

/// Product detail.
///
/// Draft and archived products are only visible to admins.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductDetail>> {
    let is_admin = user.as_ref().is_some_and(|u| u.is_admin());

    let found = state
        .products()
        .with_products(|products| {
            products
                .iter()
                .find(|p| p.id == id && (is_admin || p.is_visible()))
                .cloned()
                .map(|product| (product, catalog::related(products, id, RELATED_LIMIT)))
        })
        .await;

    let (product, related) =
        found.ok_or_else(|| AppError::NotFound(format!("product {id} not found")))?;

    Ok(Json(ProductDetail {
        on_sale: product.is_on_sale(),
        discount_percent: product.discount_percent(),
        product,
        related,
    }))
}

/// Create a product.
#[instrument(skip(state, admin, input), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = state.products().create(input).await?;
    tracing::info!(product_id = %product.id, slug = %product.slug, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product. Absent fields are unchanged.
#[instrument(skip(state, admin, update), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(update): Json<ProductUpdate>,
) -> Result<Json<Product>> {
    let product = state.products().update(id, update).await?;
    tracing::info!(product_id = %id, "Product updated");
    Ok(Json(product))
}

/// Delete a product.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    let product = state.products().delete(id).await?;
    tracing::info!(product_id = %id, name = %product.name, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Change a product's status.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn set_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<Product>> {
    let product = state.products().set_status(id, request.status).await?;
    Ok(Json(product))
}
