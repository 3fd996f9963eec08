/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Login and registration
/// - `users`: Current user, profile, password, account deletion, public catalog
/// - `products`: Vendor product management
/// - `orders`: Order placement, shopper edits and vendor status changes

use crate::error::{ApiError, ApiResult};
use serde::Serialize;
use uuid::Uuid;

pub mod health;
pub mod auth;
pub mod users;
pub mod products;
pub mod orders;

/// Body of mutations that only report success
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of the count endpoints
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}

/// Parses a path identifier
///
/// A malformed id cannot name an existing row, so it reports `not_found`.
pub(crate) fn parse_id(raw: &str, not_found: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(not_found.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "Order not found").unwrap(), id);

        let err = parse_id("42", "Order not found").unwrap_err();
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "Order not found"));
    }
}
