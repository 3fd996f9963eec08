/// Order model and database operations
///
/// An order is a shopper's request for N units of one product. It starts in
/// [`OrderStatus::Pending`]; the vendor owning the product may then move it to
/// any of the three states. The shopper may edit the quantity or delete the
/// order only while it is pending.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE orders (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     product_id UUID NOT NULL REFERENCES products(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     quantity INTEGER NOT NULL CHECK (quantity >= 1),
///     status SMALLINT NOT NULL DEFAULT 2 CHECK (status IN (0, 1, 2)),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # State Machine
///
/// ```text
///            any vendor target
///   ┌───────────────────────────────┐
///   ▼                               │
/// Pending(2) ◄──► Confirmed(1) ◄──► Cancelled(0)
/// ```
///
/// The shopper-side guards run inside the SQL statement
/// (`WHERE status = 2`), so a concurrent confirmation always wins over a stale
/// quantity edit or deletion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, PgPool, Row};
use uuid::Uuid;

use super::product::{Product, ProductOwner, ProductWithOwner};

/// Order status, stored as a SMALLINT code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[repr(i16)]
#[serde(into = "i16", try_from = "i16")]
pub enum OrderStatus {
    Cancelled = 0,
    Confirmed = 1,
    Pending = 2,
}

/// Outcome of asking for a status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    /// The order is already in the requested state
    Unchanged,

    /// The order must be moved to the requested state
    Changed { from: OrderStatus, to: OrderStatus },
}

impl OrderStatus {
    /// Integer code as stored and exchanged
    pub fn code(self) -> i16 {
        self as i16
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Pending => "pending",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Plans a move to `target`
    ///
    /// Every target is reachable from every state; only a no-op is reported
    /// differently.
    ///
    /// # Example
    ///
    /// ```
    /// use storefront_shared::models::order::{OrderStatus, StatusChange};
    ///
    /// assert_eq!(
    ///     OrderStatus::Confirmed.plan_change(OrderStatus::Confirmed),
    ///     StatusChange::Unchanged,
    /// );
    /// assert!(matches!(
    ///     OrderStatus::Cancelled.plan_change(OrderStatus::Pending),
    ///     StatusChange::Changed { .. },
    /// ));
    /// ```
    pub fn plan_change(self, target: OrderStatus) -> StatusChange {
        if self == target {
            StatusChange::Unchanged
        } else {
            StatusChange::Changed {
                from: self,
                to: target,
            }
        }
    }

    /// Message returned when the order already has this status
    pub fn already_message(&self) -> &'static str {
        match self {
            OrderStatus::Confirmed => "Order is already confirmed.",
            OrderStatus::Cancelled => "Order is already canceled.",
            OrderStatus::Pending => "This order is already in a pending state.",
        }
    }

    /// Message returned after moving an order to this status
    pub fn applied_message(&self) -> &'static str {
        match self {
            OrderStatus::Confirmed => "Order confirmed successfully.",
            OrderStatus::Cancelled => "Order canceled successfully.",
            OrderStatus::Pending => "Order returned to pending successfully.",
        }
    }
}

impl From<OrderStatus> for i16 {
    fn from(status: OrderStatus) -> Self {
        status.code()
    }
}

impl TryFrom<i16> for OrderStatus {
    type Error = String;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(OrderStatus::Cancelled),
            1 => Ok(OrderStatus::Confirmed),
            2 => Ok(OrderStatus::Pending),
            other => Err(format!("unknown order status code {}", other)),
        }
    }
}

/// Order row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,

    pub product_id: Uuid,

    /// Shopper who placed the order
    pub user_id: Uuid,

    /// Always at least 1
    pub quantity: i32,

    pub status: OrderStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Reduced projection of the shopper who placed an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderShopper {
    pub id: Uuid,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
}

/// Order joined with its product, the product's owner and the shopper
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDetails {
    pub order: Order,
    pub product: ProductWithOwner,
    pub shopper: OrderShopper,
}

impl OrderDetails {
    /// Vendor owning the ordered product
    pub fn vendor_id(&self) -> Uuid {
        self.product.product.owner_id
    }
}

impl<'r> FromRow<'r, PgRow> for OrderDetails {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let order = Order::from_row(row)?;

        let product = Product {
            id: order.product_id,
            owner_id: row.try_get("owner_id")?,
            name: row.try_get("product_name")?,
            description: row.try_get("product_description")?,
            price: row.try_get("product_price")?,
            image: row.try_get("product_image")?,
            created_at: row.try_get("product_created_at")?,
            updated_at: row.try_get("product_updated_at")?,
        };
        let owner = ProductOwner::from_row(row)?;

        let shopper = OrderShopper {
            id: order.user_id,
            email: row.try_get("shopper_email")?,
            firstname: row.try_get("shopper_firstname")?,
            lastname: row.try_get("shopper_lastname")?,
        };

        Ok(Self {
            order,
            product: ProductWithOwner { product, owner },
            shopper,
        })
    }
}

/// Input for creating a new order; status is always pending
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrder {
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub quantity: i32,
}

const DETAILS_SELECT: &str = r#"
    SELECT o.id, o.product_id, o.user_id, o.quantity, o.status, o.created_at, o.updated_at,
           p.owner_id, p.name AS product_name, p.description AS product_description,
           p.price AS product_price, p.image AS product_image,
           p.created_at AS product_created_at, p.updated_at AS product_updated_at,
           v.email AS owner_email, v.firstname AS owner_firstname, v.lastname AS owner_lastname,
           s.email AS shopper_email, s.firstname AS shopper_firstname, s.lastname AS shopper_lastname
    FROM orders o
    JOIN products p ON p.id = o.product_id
    JOIN users v ON v.id = p.owner_id
    JOIN users s ON s.id = o.user_id
"#;

impl Order {
    /// Creates a new pending order
    ///
    /// # Errors
    ///
    /// Returns an error if the product or user doesn't exist (foreign key
    /// violation), the quantity is below 1 (check violation) or the database
    /// connection fails
    pub async fn create(pool: &PgPool, data: CreateOrder) -> Result<Self, sqlx::Error> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (product_id, user_id, quantity, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id, product_id, user_id, quantity, status, created_at, updated_at
            "#,
        )
        .bind(data.product_id)
        .bind(data.user_id)
        .bind(data.quantity)
        .bind(OrderStatus::Pending)
        .fetch_one(pool)
        .await?;

        Ok(order)
    }

    /// Finds an order by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, product_id, user_id, quantity, status, created_at, updated_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(order)
    }

    /// Finds an order with its product, vendor and shopper
    pub async fn find_details(pool: &PgPool, id: Uuid) -> Result<Option<OrderDetails>, sqlx::Error> {
        let query = format!("{} WHERE o.id = $1", DETAILS_SELECT);

        let details = sqlx::query_as::<_, OrderDetails>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(details)
    }

    /// Lists the orders a shopper placed, newest first
    pub async fn list_details_for_shopper(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<OrderDetails>, sqlx::Error> {
        let query = format!("{} WHERE o.user_id = $1 ORDER BY o.created_at DESC", DETAILS_SELECT);

        let orders = sqlx::query_as::<_, OrderDetails>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        Ok(orders)
    }

    /// Lists the orders placed on a vendor's products, newest first
    pub async fn list_details_for_vendor(
        pool: &PgPool,
        vendor_id: Uuid,
    ) -> Result<Vec<OrderDetails>, sqlx::Error> {
        let query = format!("{} WHERE p.owner_id = $1 ORDER BY o.created_at DESC", DETAILS_SELECT);

        let orders = sqlx::query_as::<_, OrderDetails>(&query)
            .bind(vendor_id)
            .fetch_all(pool)
            .await?;

        Ok(orders)
    }

    /// Counts the orders placed on a vendor's products
    pub async fn count_for_vendor(pool: &PgPool, vendor_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM orders o
            JOIN products p ON p.id = o.product_id
            WHERE p.owner_id = $1
            "#,
        )
        .bind(vendor_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Sets the quantity of a pending order
    ///
    /// # Returns
    ///
    /// The updated order, or None if the order doesn't exist or is no longer
    /// pending
    pub async fn update_quantity_if_pending(
        pool: &PgPool,
        id: Uuid,
        quantity: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET quantity = $2, updated_at = NOW()
            WHERE id = $1 AND status = $3
            RETURNING id, product_id, user_id, quantity, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(OrderStatus::Pending)
        .fetch_optional(pool)
        .await?;

        Ok(order)
    }

    /// Deletes a pending order
    ///
    /// # Returns
    ///
    /// True if deleted, false if the order doesn't exist or is no longer
    /// pending
    pub async fn delete_if_pending(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1 AND status = $2")
            .bind(id)
            .bind(OrderStatus::Pending)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Sets the status of an order unconditionally
    pub async fn set_status(
        pool: &PgPool,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, product_id, user_id, quantity, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(pool)
        .await?;

        Ok(order)
    }
}
