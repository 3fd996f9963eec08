/// Database models for the storefront
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: Shopper and vendor accounts, role tags
/// - `product`: Vendor-owned catalog entries
/// - `order`: Orders placed by shoppers and their status lifecycle
///
/// Authorization is not enforced here; see [`crate::services`].

pub mod user;
pub mod product;
pub mod order;
