/// Wire projections returned to clients
///
/// Models never reach the HTTP layer directly. These views decide which
/// relations are embedded and render timestamps as `YYYY-MM-DD HH:MM:SS`
/// (UTC). Password hashes have no view field and cannot leak.
///
/// # Example
///
/// ```no_run
/// use storefront_shared::models::product::Product;
/// use storefront_shared::views::to_owned_product_view;
///
/// # fn example(product: Product) {
/// let view = to_owned_product_view(&product);
/// assert!(view.owner.is_none());
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{
    order::{OrderDetails, OrderShopper},
    product::{Product, ProductOwner, ProductWithOwner},
    user::User,
};

/// Timestamp layout used in every view
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Reduced user projection embedded in products and orders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
}

impl From<&ProductOwner> for UserSummary {
    fn from(owner: &ProductOwner) -> Self {
        Self {
            id: owner.id,
            email: owner.email.clone(),
            firstname: owner.firstname.clone(),
            lastname: owner.lastname.clone(),
        }
    }
}

impl From<&OrderShopper> for UserSummary {
    fn from(shopper: &OrderShopper) -> Self {
        Self {
            id: shopper.id,
            email: shopper.email.clone(),
            firstname: shopper.firstname.clone(),
            lastname: shopper.lastname.clone(),
        }
    }
}

/// Product projection
///
/// `owner` is always present in the JSON and is `null` when not embedded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image: String,
    pub created_at: String,
    pub updated_at: String,
    pub owner: Option<UserSummary>,
}

/// Order projection with its product (and vendor) and shopper
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: Uuid,
    pub product: ProductView,
    pub user: UserSummary,
    pub quantity: i32,

    /// Status code (0 cancelled, 1 confirmed, 2 pending)
    pub status: i16,
    pub created_at: String,
    pub updated_at: String,
}

/// Profile projection of the current user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub avatar: Option<String>,
    pub roles: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

fn product_view(product: &Product, owner: Option<UserSummary>) -> ProductView {
    ProductView {
        id: product.id,
        name: product.name.clone(),
        description: product.description.clone(),
        price: product.price,
        image: product.image.clone(),
        created_at: format_timestamp(&product.created_at),
        updated_at: format_timestamp(&product.updated_at),
        owner,
    }
}

/// Projects a product, embedding its owner only when `include_owner` is set
pub fn to_product_view(product: &ProductWithOwner, include_owner: bool) -> ProductView {
    let owner = include_owner.then(|| UserSummary::from(&product.owner));
    product_view(&product.product, owner)
}

/// Projects a product listed to its own vendor; the owner is never embedded
pub fn to_owned_product_view(product: &Product) -> ProductView {
    product_view(product, None)
}

pub fn to_order_view(details: &OrderDetails) -> OrderView {
    OrderView {
        id: details.order.id,
        product: to_product_view(&details.product, true),
        user: UserSummary::from(&details.shopper),
        quantity: details.order.quantity,
        status: details.order.status.code(),
        created_at: format_timestamp(&details.order.created_at),
        updated_at: format_timestamp(&details.order.updated_at),
    }
}

pub fn to_user_view(user: &User) -> UserView {
    UserView {
        id: user.id,
        firstname: user.firstname.clone(),
        lastname: user.lastname.clone(),
        email: user.email.clone(),
        avatar: user.avatar.clone(),
        roles: user.roles.clone(),
        created_at: format_timestamp(&user.created_at),
        updated_at: format_timestamp(&user.updated_at),
    }
}
