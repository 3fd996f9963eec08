/// Authorization helpers and permission checks
///
/// Every check takes the caller's [`AuthContext`] explicitly. There are two
/// kinds of rule:
///
/// 1. **Role**: shopper operations need `ROLE_USER`, vendor operations need
///    `ROLE_VENDOR`
/// 2. **Ownership**: a product is managed only by its owner, an order is
///    edited only by the shopper who placed it and its status is set only by
///    the vendor owning the ordered product
///
/// The `is_*` predicates are pure; the `require_*` wrappers turn a failed
/// predicate into an [`AuthzError`].
///
/// # Example
///
/// ```
/// use storefront_shared::auth::authorization::{require_ownership, require_role};
/// use storefront_shared::auth::middleware::AuthContext;
/// use storefront_shared::models::user::Role;
/// use uuid::Uuid;
///
/// let vendor = AuthContext::new(Uuid::new_v4(), vec![Role::Vendor]);
///
/// assert!(require_role(&vendor, Role::Vendor).is_ok());
/// assert!(require_role(&vendor, Role::Shopper).is_err());
/// assert!(require_ownership(&vendor, vendor.user_id).is_ok());
/// ```

use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::{
    order::{Order, OrderDetails},
    product::Product,
    user::Role,
};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthzError {
    /// Caller lacks the role the operation needs
    #[error("Access denied: requires {}", .0.as_str())]
    MissingRole(Role),

    /// Caller doesn't own the resource
    #[error("Access denied.")]
    NotAuthorized,

    /// Caller asked for another user's account
    #[error("Access denied: token mismatch.")]
    TokenMismatch,
}

/// Checks that the caller holds a role
pub fn require_role(auth: &AuthContext, role: Role) -> Result<(), AuthzError> {
    if !auth.has_role(role) {
        return Err(AuthzError::MissingRole(role));
    }

    Ok(())
}

/// Checks that the caller holds at least one known role
pub fn require_any_role(auth: &AuthContext) -> Result<(), AuthzError> {
    if auth.roles.is_empty() {
        return Err(AuthzError::NotAuthorized);
    }

    Ok(())
}

/// Checks that the caller is the owner of a resource
pub fn require_ownership(auth: &AuthContext, resource_owner_id: Uuid) -> Result<(), AuthzError> {
    if auth.user_id != resource_owner_id {
        return Err(AuthzError::NotAuthorized);
    }

    Ok(())
}

/// Checks that the caller is the account they asked for
pub fn require_self(auth: &AuthContext, user_id: Uuid) -> Result<(), AuthzError> {
    if auth.user_id != user_id {
        return Err(AuthzError::TokenMismatch);
    }

    Ok(())
}

pub fn is_product_owner(product: &Product, user_id: Uuid) -> bool {
    product.owner_id == user_id
}

pub fn is_order_shopper(order: &Order, user_id: Uuid) -> bool {
    order.user_id == user_id
}

/// True when `user_id` owns the product the order was placed on
pub fn is_order_vendor(details: &OrderDetails, user_id: Uuid) -> bool {
    details.vendor_id() == user_id
}

pub fn require_product_owner(auth: &AuthContext, product: &Product) -> Result<(), AuthzError> {
    if !is_product_owner(product, auth.user_id) {
        return Err(AuthzError::NotAuthorized);
    }

    Ok(())
}

pub fn require_order_shopper(auth: &AuthContext, order: &Order) -> Result<(), AuthzError> {
    if !is_order_shopper(order, auth.user_id) {
        return Err(AuthzError::NotAuthorized);
    }

    Ok(())
}

pub fn require_order_vendor(auth: &AuthContext, details: &OrderDetails) -> Result<(), AuthzError> {
    if !is_order_vendor(details, auth.user_id) {
        return Err(AuthzError::NotAuthorized);
    }

    Ok(())
}
