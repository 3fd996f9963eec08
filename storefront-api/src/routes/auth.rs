/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/login` - Exchange credentials for a bearer token
/// - `POST /api/register` - Create a shopper or vendor account

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
    routes::MessageResponse,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use storefront_shared::services::identity::{self, LoginInput, RegisterInput, INVALID_CREDENTIALS};
use uuid::Uuid;

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: SessionUser,
}

/// Authenticated user and their bearer token
#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub token: String,
}

/// Login endpoint
///
/// ```text
/// POST /api/login
/// Content-Type: application/json
///
/// { "email": "shopper@example.com", "password": "secret-password" }
/// ```
///
/// # Response
///
/// ```json
/// { "user": { "id": "uuid", "token": "eyJ..." } }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: any credential problem, always with the same message,
///   including a body that cannot be read
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginInput>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Unreadable login body");
        ApiError::Unauthorized(INVALID_CREDENTIALS.to_string())
    })?;
    let settings = state.config.token_settings();
    let session = identity::login(&state.db, &settings, req).await?;

    Ok(Json(LoginResponse {
        user: SessionUser {
            id: session.user_id,
            token: session.token,
        },
    }))
}

/// Registration endpoint
///
/// ```text
/// POST /api/register
/// Content-Type: application/json
///
/// {
///   "firstname": "Ada",
///   "lastname": "Lovelace",
///   "email": "ada@example.com",
///   "password": "secret-password",
///   "confirm_password": "secret-password",
///   "role": "ROLE_VENDOR"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: every failing field, e.g. a taken email
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterInput>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    identity::register(&state.db, req).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}
