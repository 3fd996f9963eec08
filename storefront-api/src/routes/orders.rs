/// Order ("command") endpoints
///
/// Shoppers place orders and may edit or delete them while they are
/// pending. Vendors see the orders placed on their products and move them
/// between pending, confirmed and cancelled.
///
/// # Endpoints
///
/// Shopper:
/// - `GET    /api/commands` - The caller's orders
/// - `POST   /api/commands` - Place an order
/// - `PATCH  /api/commands/:id` - Change the quantity
/// - `DELETE /api/commands/:id` - Delete the order
///
/// Vendor:
/// - `GET  /api/commands/vendor/list` - Orders on the caller's products
/// - `GET  /api/commands/count/vendor` - Number of those orders
/// - `POST /api/commands/:id/confirm`
/// - `POST /api/commands/:id/cancel`
/// - `POST /api/commands/:id/pending`

use crate::{
    app::AppState,
    error::ApiResult,
    extract::ApiJson,
    routes::{parse_id, CountResponse, MessageResponse},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use storefront_shared::{
    auth::middleware::AuthContext,
    services::orders::{self, CreateOrderInput, QuantityInput, StatusOutcome},
    views::{to_order_view, OrderView},
};

const NOT_FOUND: &str = "Order not found";

/// Create/update response
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub message: String,
    pub order: OrderView,
}

/// Status change response
///
/// `status` is the integer code (0 cancelled, 1 confirmed, 2 pending).
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: String,
    pub status: i16,
}

impl From<StatusOutcome> for StatusResponse {
    fn from(outcome: StatusOutcome) -> Self {
        Self {
            message: outcome.message.to_string(),
            status: outcome.status.code(),
        }
    }
}

pub async fn list_orders(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<OrderView>>> {
    let placed = orders::list_for_shopper(&state.db, &auth).await?;

    Ok(Json(placed.iter().map(to_order_view).collect()))
}

/// Places an order
///
/// ```text
/// POST /api/commands
///
/// { "product": "3f2b...", "quantity": 3 }
/// ```
///
/// A missing or non-numeric `quantity` orders one unit.
pub async fn create_order(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(req): ApiJson<CreateOrderInput>,
) -> ApiResult<(StatusCode, Json<OrderResponse>)> {
    let details = orders::create(&state.db, &auth, req).await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderResponse {
            message: "Order created successfully.".to_string(),
            order: to_order_view(&details),
        }),
    ))
}

pub async fn update_order(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<QuantityInput>,
) -> ApiResult<Json<OrderResponse>> {
    let order_id = parse_id(&id, NOT_FOUND)?;
    let details = orders::update_quantity(&state.db, &auth, order_id, req).await?;

    Ok(Json(OrderResponse {
        message: "Order updated successfully.".to_string(),
        order: to_order_view(&details),
    }))
}

pub async fn delete_order(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let order_id = parse_id(&id, NOT_FOUND)?;
    orders::delete_order(&state.db, &auth, order_id).await?;

    Ok(Json(MessageResponse::new("Order deleted successfully.")))
}

pub async fn vendor_orders(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<OrderView>>> {
    let placed = orders::list_for_vendor(&state.db, &auth).await?;

    Ok(Json(placed.iter().map(to_order_view).collect()))
}

pub async fn vendor_count(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<CountResponse>> {
    let count = orders::count_for_vendor(&state.db, &auth).await?;

    Ok(Json(CountResponse { count }))
}

pub async fn confirm_order(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<StatusResponse>> {
    let order_id = parse_id(&id, NOT_FOUND)?;
    let outcome = orders::confirm(&state.db, &auth, order_id).await?;

    Ok(Json(outcome.into()))
}

pub async fn cancel_order(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<StatusResponse>> {
    let order_id = parse_id(&id, NOT_FOUND)?;
    let outcome = orders::cancel(&state.db, &auth, order_id).await?;

    Ok(Json(outcome.into()))
}

/// Returns an order to pending
pub async fn pending_order(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<StatusResponse>> {
    let order_id = parse_id(&id, NOT_FOUND)?;
    let outcome = orders::mark_pending(&state.db, &auth, order_id).await?;

    Ok(Json(outcome.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_shared::models::order::OrderStatus;
    use uuid::Uuid;

    #[test]
    fn test_status_response_from_outcome() {
        let outcome = StatusOutcome {
            order_id: Uuid::new_v4(),
            status: OrderStatus::Confirmed,
            changed: false,
            message: OrderStatus::Confirmed.already_message(),
        };

        let response = StatusResponse::from(outcome);
        assert_eq!(response.status, 1);
        assert_eq!(response.message, "Order is already confirmed.");
    }
}
