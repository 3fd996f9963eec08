/// Order lifecycle operations
///
/// Rights over an order are split:
///
/// - the **shopper** who placed it may change its quantity or delete it, and
///   only while it is pending
/// - the **vendor** owning the ordered product may set its status to any of
///   the three states, from any state
///
/// Shopper edits re-check the pending state inside the UPDATE/DELETE
/// statement. If the vendor moves the order between the read and the write,
/// the edit is reported as a state conflict instead of overwriting the
/// vendor's decision. Vendor status changes are last-write-wins.
///
/// # Example
///
/// ```no_run
/// use storefront_shared::auth::middleware::AuthContext;
/// use storefront_shared::services::orders::{confirm, create, CreateOrderInput};
/// use serde_json::json;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, shopper: AuthContext, vendor: AuthContext) -> Result<(), Box<dyn std::error::Error>> {
/// let placed = create(&pool, &shopper, CreateOrderInput {
///     product: Some(json!("8c0e4c8e-3f0c-4a53-9d43-1b2b0c4f3c11")),
///     quantity: Some(json!(3)),
/// }).await?;
///
/// let outcome = confirm(&pool, &vendor, placed.order.id).await?;
/// println!("{}", outcome.message);
/// # Ok(())
/// # }
/// ```

use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::auth::{
    authorization::{require_order_shopper, require_order_vendor, require_role},
    middleware::AuthContext,
};
use crate::models::{
    order::{CreateOrder, Order, OrderDetails, OrderStatus, StatusChange},
    product::Product,
    user::Role,
};
use crate::validation::{coerce_new_quantity, coerce_quantity_update, FieldErrors};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateOrderInput {
    /// Product id; kept raw so a missing or malformed id can be told apart
    pub product: Option<Value>,
    pub quantity: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuantityInput {
    pub quantity: Option<Value>,
}

/// Result of a vendor status request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusOutcome {
    pub order_id: Uuid,
    pub status: OrderStatus,

    /// False when the order already had the requested status
    pub changed: bool,
    pub message: &'static str,
}

/// Shopper-side edits, each allowed only while pending
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShopperEdit {
    Modify,
    Delete,
}

impl ShopperEdit {
    fn conflict_message(self) -> &'static str {
        match self {
            ShopperEdit::Modify => "Only pending orders can be modified.",
            ShopperEdit::Delete => "Only pending orders can be deleted.",
        }
    }
}

fn order_not_found() -> ServiceError {
    ServiceError::NotFound("Order not found".to_string())
}

fn product_not_found() -> ServiceError {
    ServiceError::NotFound("Product not found.".to_string())
}

/// Reads the product reference of a new order
///
/// `Err` when the reference is absent or empty, `Ok(None)` when it is present
/// but cannot name any product.
fn parse_product_ref(value: Option<&Value>) -> Result<Option<Uuid>, FieldErrors> {
    let required = || FieldErrors::single("product", "Product ID is required.");

    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Err(required()),
        Some(Value::String(s)) if s.trim().is_empty() => Err(required()),
        Some(Value::String(s)) => Ok(Uuid::parse_str(s.trim()).ok()),
        Some(_) => Ok(None),
    }
}

/// Checks a coerced quantity and narrows it to the stored width
fn validate_quantity(quantity: i64) -> Result<i32, FieldErrors> {
    if quantity < 1 {
        return Err(FieldErrors::single("quantity", "Quantity must be at least 1."));
    }

    i32::try_from(quantity).map_err(|_| FieldErrors::single("quantity", "Quantity is too large."))
}

/// Shopper ownership first, then the pending state
fn check_shopper_edit(auth: &AuthContext, order: &Order, edit: ShopperEdit) -> ServiceResult<()> {
    require_order_shopper(auth, order)?;

    if !order.status.is_pending() {
        return Err(ServiceError::StateConflict(edit.conflict_message().to_string()));
    }

    Ok(())
}

async fn load_details(pool: &PgPool, order_id: Uuid) -> ServiceResult<OrderDetails> {
    Order::find_details(pool, order_id)
        .await?
        .ok_or_else(order_not_found)
}

/// Places a pending order for the caller
///
/// A missing, empty, zero or non-numeric quantity becomes 1.
pub async fn create(pool: &PgPool, auth: &AuthContext, input: CreateOrderInput) -> ServiceResult<OrderDetails> {
    require_role(auth, Role::Shopper)?;

    let product_id = parse_product_ref(input.product.as_ref())?.ok_or_else(product_not_found)?;

    let product = Product::find_by_id(pool, product_id)
        .await?
        .ok_or_else(product_not_found)?;

    let quantity = validate_quantity(coerce_new_quantity(input.quantity.as_ref()))?;

    let order = Order::create(
        pool,
        CreateOrder {
            product_id: product.id,
            user_id: auth.user_id,
            quantity,
        },
    )
    .await?;

    info!(
        order_id = %order.id,
        product_id = %product.id,
        shopper_id = %auth.user_id,
        quantity,
        "Order placed"
    );

    load_details(pool, order.id).await
}

/// Lists the caller's orders, newest first
pub async fn list_for_shopper(pool: &PgPool, auth: &AuthContext) -> ServiceResult<Vec<OrderDetails>> {
    require_role(auth, Role::Shopper)?;

    Ok(Order::list_details_for_shopper(pool, auth.user_id).await?)
}

/// Lists orders placed on the caller's products, newest first
pub async fn list_for_vendor(pool: &PgPool, auth: &AuthContext) -> ServiceResult<Vec<OrderDetails>> {
    require_role(auth, Role::Vendor)?;

    Ok(Order::list_details_for_vendor(pool, auth.user_id).await?)
}

/// Counts orders placed on the caller's products
pub async fn count_for_vendor(pool: &PgPool, auth: &AuthContext) -> ServiceResult<i64> {
    require_role(auth, Role::Vendor)?;

    Ok(Order::count_for_vendor(pool, auth.user_id).await?)
}

/// Changes the quantity of one of the caller's pending orders
///
/// A missing or non-numeric quantity becomes 0 and is rejected.
pub async fn update_quantity(
    pool: &PgPool,
    auth: &AuthContext,
    order_id: Uuid,
    input: QuantityInput,
) -> ServiceResult<OrderDetails> {
    require_role(auth, Role::Shopper)?;

    let order = Order::find_by_id(pool, order_id)
        .await?
        .ok_or_else(order_not_found)?;

    check_shopper_edit(auth, &order, ShopperEdit::Modify)?;

    let quantity = validate_quantity(coerce_quantity_update(input.quantity.as_ref()))?;

    if Order::update_quantity_if_pending(pool, order.id, quantity).await?.is_none() {
        warn!(order_id = %order.id, "Quantity edit lost a race with a status change");
        return Err(ServiceError::StateConflict(
            ShopperEdit::Modify.conflict_message().to_string(),
        ));
    }

    info!(order_id = %order.id, quantity, "Order quantity updated");

    load_details(pool, order.id).await
}

/// Deletes one of the caller's pending orders
pub async fn delete_order(pool: &PgPool, auth: &AuthContext, order_id: Uuid) -> ServiceResult<()> {
    require_role(auth, Role::Shopper)?;

    let order = Order::find_by_id(pool, order_id)
        .await?
        .ok_or_else(order_not_found)?;

    check_shopper_edit(auth, &order, ShopperEdit::Delete)?;

    if !Order::delete_if_pending(pool, order.id).await? {
        warn!(order_id = %order.id, "Order deletion lost a race with a status change");
        return Err(ServiceError::StateConflict(
            ShopperEdit::Delete.conflict_message().to_string(),
        ));
    }

    info!(order_id = %order.id, "Order deleted");

    Ok(())
}

/// Moves an order placed on one of the caller's products to `target`
///
/// Asking for the current status succeeds without writing.
pub async fn set_status(
    pool: &PgPool,
    auth: &AuthContext,
    order_id: Uuid,
    target: OrderStatus,
) -> ServiceResult<StatusOutcome> {
    require_role(auth, Role::Vendor)?;

    let details = load_details(pool, order_id).await?;

    require_order_vendor(auth, &details)?;

    match details.order.status.plan_change(target) {
        StatusChange::Unchanged => {
            debug!(order_id = %order_id, status = target.as_str(), "Order already in requested status");

            Ok(StatusOutcome {
                order_id,
                status: target,
                changed: false,
                message: target.already_message(),
            })
        }
        StatusChange::Changed { from, to } => {
            let order = Order::set_status(pool, order_id, to)
                .await?
                .ok_or_else(order_not_found)?;

            info!(
                order_id = %order.id,
                from = from.as_str(),
                to = to.as_str(),
                vendor_id = %auth.user_id,
                "Order status changed"
            );

            Ok(StatusOutcome {
                order_id: order.id,
                status: order.status,
                changed: true,
                message: to.applied_message(),
            })
        }
    }
}

pub async fn confirm(pool: &PgPool, auth: &AuthContext, order_id: Uuid) -> ServiceResult<StatusOutcome> {
    set_status(pool, auth, order_id, OrderStatus::Confirmed).await
}

pub async fn cancel(pool: &PgPool, auth: &AuthContext, order_id: Uuid) -> ServiceResult<StatusOutcome> {
    set_status(pool, auth, order_id, OrderStatus::Cancelled).await
}

pub async fn mark_pending(pool: &PgPool, auth: &AuthContext, order_id: Uuid) -> ServiceResult<StatusOutcome> {
    set_status(pool, auth, order_id, OrderStatus::Pending).await
}
