//! Invoice download.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::instrument;

use afrovibz_core::OrderId;

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::services::invoice;
use crate::state::AppState;

/// Download an order's invoice as a text attachment.
///
/// Only the customer who placed the order and admins may download it;
/// anyone else gets 404.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn download(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Response> {
    let order = state
        .orders()
        .get(id)
        .await
        .filter(|order| order.user_id == user.id || user.is_admin())
        .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

    let body = invoice::render(&order, &state.config().base_url, Utc::now())?;
    let disposition = format!("attachment; filename=\"{}\"", invoice::filename(&order));

    tracing::info!(order = %order.number, "Invoice downloaded");

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
