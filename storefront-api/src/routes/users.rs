/// Account endpoints and the public catalog
///
/// # Endpoints
///
/// - `GET    /api/current-user/:id` - The caller's own account
/// - `PUT    /api/user/profile` - Partial profile edit
/// - `PUT    /api/user/change-password` - Password change
/// - `DELETE /api/user/delete/my-account` - Delete the caller with everything they own
/// - `GET    /api/user/products` - Public catalog (no authentication)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
    routes::MessageResponse,
};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use storefront_shared::{
    auth::{authorization::AuthzError, middleware::AuthContext},
    services::{
        catalog,
        identity::{self, ChangePasswordInput, ProfileInput},
    },
    views::{to_product_view, to_user_view, ProductView, UserView},
};
use uuid::Uuid;

/// Profile edit response
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub message: String,
    pub user: UserView,
}

/// Returns the caller's account; any other id, malformed ones included, is refused
pub async fn current_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<UserView>> {
    let user_id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::Forbidden(AuthzError::TokenMismatch.to_string()))?;
    let user = identity::get_current_user(&state.db, &auth, user_id).await?;

    Ok(Json(to_user_view(&user)))
}

/// Edits firstname, lastname, email or avatar
///
/// ```text
/// PUT /api/user/profile
///
/// { "firstname": "Grace", "avatar": "" }
/// ```
///
/// An empty `avatar` removes it; absent fields are left alone.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(req): ApiJson<ProfileInput>,
) -> ApiResult<Json<ProfileResponse>> {
    let user = identity::update_profile(&state.db, &auth, req).await?;

    Ok(Json(ProfileResponse {
        message: "Profile updated successfully".to_string(),
        user: to_user_view(&user),
    }))
}

/// Changes the caller's password
///
/// ```text
/// PUT /api/user/change-password
///
/// {
///   "old_password": "old-secret",
///   "new_password": "new-secret",
///   "confirm_password": "new-secret"
/// }
/// ```
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(req): ApiJson<ChangePasswordInput>,
) -> ApiResult<Json<MessageResponse>> {
    identity::change_password(&state.db, &auth, req).await?;

    Ok(Json(MessageResponse::new("Password changed successfully")))
}

pub async fn delete_account(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<MessageResponse>> {
    identity::delete_account(&state.db, &auth).await?;

    Ok(Json(MessageResponse::new("Your account deleted successfully")))
}

/// Lists every product with its owner, newest first
pub async fn public_products(State(state): State<AppState>) -> ApiResult<Json<Vec<ProductView>>> {
    let products = catalog::list_public(&state.db).await?;

    Ok(Json(products.iter().map(|p| to_product_view(p, true)).collect()))
}
