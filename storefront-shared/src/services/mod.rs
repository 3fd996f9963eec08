/// Business operations of the storefront
///
/// Each service function receives the caller's [`AuthContext`] explicitly,
/// performs its role and ownership checks through
/// [`crate::auth::authorization`], talks to the models and returns data the
/// API turns into views.
///
/// # Modules
///
/// - `identity`: login, token resolution, registration and account management
/// - `catalog`: vendor product management and the public catalog
/// - `orders`: order placement, shopper edits and the vendor status lifecycle
///
/// [`AuthContext`]: crate::auth::middleware::AuthContext

use crate::auth::{authorization::AuthzError, jwt::JwtError, password::PasswordError};
use crate::validation::FieldErrors;

pub mod identity;
pub mod catalog;
pub mod orders;

/// Error type shared by every service
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Requested resource doesn't exist
    #[error("{0}")]
    NotFound(String),

    /// Caller may not act on the resource
    #[error("{0}")]
    Forbidden(String),

    /// Input failed validation
    #[error("Validation failed")]
    Validation(FieldErrors),

    /// Caller could not be authenticated
    #[error("{0}")]
    Unauthenticated(String),

    /// Resource is not in a state that allows the operation
    #[error("{0}")]
    StateConflict(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing error
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Token creation error
    #[error(transparent)]
    Token(#[from] JwtError),
}

impl From<AuthzError> for ServiceError {
    fn from(err: AuthzError) -> Self {
        ServiceError::Forbidden(err.to_string())
    }
}

impl From<FieldErrors> for ServiceError {
    fn from(errors: FieldErrors) -> Self {
        ServiceError::Validation(errors)
    }
}

/// Result alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
