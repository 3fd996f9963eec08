/// Authentication and authorization utilities
///
/// This module provides the security primitives of the storefront:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and password rules
/// - [`jwt`]: Bearer token issuance and validation
/// - [`middleware`]: Request identity (`AuthContext`) and bearer header parsing
/// - [`authorization`]: Role checks and ownership predicates
///
/// # Example
///
/// ```no_run
/// use storefront_shared::auth::password::{hash_password, verify_password};
/// use storefront_shared::auth::jwt::{create_token, validate_token, Claims};
/// use storefront_shared::models::user::Role;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// // Password authentication
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// // Token issuance
/// let claims = Claims::new(Uuid::new_v4(), &[Role::Vendor], chrono::Duration::hours(1));
/// let token = create_token(&claims, "secret-key")?;
/// let validated = validate_token(&token, "secret-key")?;
/// assert_eq!(validated.sub, claims.sub);
/// # Ok(())
/// # }
/// ```

pub mod password;
pub mod jwt;
pub mod middleware;
pub mod authorization;
