//! Mock authentication API.
//!
//! Login checks the demo credential table (plus anyone who registered since
//! start-up), stores the user in the session and issues a bearer token.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, bearer_token, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Token and user returned by login and registration.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

/// Start a session and issue a token for `user`.
async fn sign_in(state: &AppState, session: &Session, user: User) -> Result<LoginResponse> {
    let current = CurrentUser::from(&user);
    set_current_user(session, &current).await?;
    let issued = state.tokens().issue(current).await;

    set_sentry_user(&user.id, Some(user.email.as_str()));

    Ok(LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        user,
    })
}

/// Log in with email and password.
#[instrument(skip(state, session, request))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let user = AuthService::new(state.accounts())
        .login(&request.email, &request.password)
        .await
        .inspect_err(|_| tracing::warn!("Failed login attempt"))?;

    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");
    Ok(Json(sign_in(&state, &session, user).await?))
}

/// Register a customer account and log it in.
#[instrument(skip(state, session, request))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<LoginResponse>)> {
    let user = AuthService::new(state.accounts())
        .register(&request.email, &request.password, &request.name)
        .await?;

    tracing::info!(user_id = %user.id, "Customer registered");
    Ok((StatusCode::CREATED, Json(sign_in(&state, &session, user).await?)))
}

/// Log out: revoke the bearer token, if any, and end the session.
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
) -> Result<StatusCode> {
    if let Some(token) = bearer_token(&headers) {
        state.tokens().revoke(token).await;
    }
    clear_current_user(&session).await?;
    session.flush().await?;
    clear_sentry_user();

    Ok(StatusCode::NO_CONTENT)
}

/// The logged-in user.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn me(State(state): State<AppState>, RequireAuth(user): RequireAuth) -> Result<Json<User>> {
    AuthService::new(state.accounts())
        .get_user(user.id)
        .await
        .map(Json)
        .map_err(|_| AppError::Unauthorized("Account no longer exists".to_string()))
}
