/// Vendor product management
///
/// Every endpoint requires a vendor; single-product endpoints also require
/// the caller to own the product.
///
/// # Endpoints
///
/// - `GET    /api/products` - The caller's products
/// - `POST   /api/products` - Create a product
/// - `GET    /api/products/count/vendor` - Number of the caller's products
/// - `GET    /api/products/:id` - One of the caller's products
/// - `PUT    /api/products/:id` - Partial update
/// - `DELETE /api/products/:id` - Delete (its orders go with it)

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
    services::catalog::{self, ProductInput},
    views::{to_owned_product_view, ProductView},
};

const NOT_FOUND: &str = "Product not found";

/// Create/update response
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub message: String,
    pub product: ProductView,
}

pub async fn list_products(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<ProductView>>> {
    let products = catalog::list_owned(&state.db, &auth).await?;

    Ok(Json(products.iter().map(to_owned_product_view).collect()))
}

/// Creates a product owned by the caller
///
/// ```text
/// POST /api/products
///
/// { "name": "Teapot", "description": "Cast iron", "price": "24.90", "image": "teapot.png" }
/// ```
///
/// A missing or non-numeric `price` is stored as 0.
pub async fn create_product(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(req): ApiJson<ProductInput>,
) -> ApiResult<(StatusCode, Json<ProductResponse>)> {
    let product = catalog::create(&state.db, &auth, req).await?;

    Ok((
        StatusCode::CREATED,
        Json(ProductResponse {
            message: "Product added successfully.".to_string(),
            product: to_owned_product_view(&product),
        }),
    ))
}

pub async fn count_products(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<CountResponse>> {
    let count = catalog::count(&state.db, &auth).await?;

    Ok(Json(CountResponse { count }))
}

pub async fn get_product(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<ProductView>> {
    let product_id = parse_id(&id, NOT_FOUND)?;
    let product = catalog::get_owned(&state.db, &auth, product_id).await?;

    Ok(Json(to_owned_product_view(&product)))
}

/// Updates the given fields of one of the caller's products
pub async fn update_product(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<ProductInput>,
) -> ApiResult<Json<ProductResponse>> {
    let product_id = parse_id(&id, NOT_FOUND)?;
    let product = catalog::update(&state.db, &auth, product_id, req).await?;

    Ok(Json(ProductResponse {
        message: "Product updated successfully.".to_string(),
        product: to_owned_product_view(&product),
    }))
}

pub async fn delete_product(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let product_id = parse_id(&id, NOT_FOUND)?;
    catalog::delete(&state.db, &auth, product_id).await?;

    Ok(Json(MessageResponse::new("Product deleted successfully.")))
}
