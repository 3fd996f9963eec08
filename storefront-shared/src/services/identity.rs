/// Identity and session operations
///
/// Covers login, bearer token resolution and the self-service account
/// operations (registration, profile edit, password change, deletion).
///
/// Login failures of any kind collapse into one generic message so that a
/// client cannot tell an unknown email from a wrong password.
///
/// # Example
///
/// ```no_run
/// use storefront_shared::services::identity::{login, LoginInput, TokenSettings};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let settings = TokenSettings::new("a-secret-of-at-least-32-characters!", 3600);
///
/// let session = login(&pool, &settings, LoginInput {
///     email: Some("shopper@example.com".to_string()),
///     password: Some("correct horse".to_string()),
/// }).await?;
///
/// println!("token for {}: {}", session.user_id, session.token);
/// # Ok(())
/// # }
/// ```

use chrono::Duration;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use super::{ServiceError, ServiceResult};
use crate::auth::{
    authorization::{require_any_role, require_self},
    jwt::{create_token, validate_token, Claims},
    middleware::{AuthContext, AuthError},
    password::{hash_password, password_length_ok, verify_password, PasswordError},
};
use crate::models::user::{CreateUser, Role, UpdateUser, User};
use crate::validation::{non_blank, FieldErrors};

/// Message returned for every failed login
pub const INVALID_CREDENTIALS: &str = "Email or password is invalid!";

/// Token signing settings
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub secret: String,
    pub ttl: Duration,
}

impl TokenSettings {
    pub fn new(secret: impl Into<String>, ttl_seconds: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::seconds(ttl_seconds),
        }
    }
}

/// Issued bearer token
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterInput {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    pub role: Option<String>,
}

/// Profile edit; absent fields keep their value
///
/// An empty `avatar` clears the avatar.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileInput {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangePasswordInput {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

/// Account fields shared by registration and profile edit
#[derive(Debug, Validate)]
struct AccountFields {
    #[validate(
        email(message = "Please enter a valid email address."),
        length(max = 180, message = "Email cannot be longer than 180 characters.")
    )]
    email: String,

    #[validate(length(max = 255, message = "Firstname cannot be longer than 255 characters."))]
    firstname: String,

    #[validate(length(max = 255, message = "Lastname cannot be longer than 255 characters."))]
    lastname: String,
}

impl AccountFields {
    fn check(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if self.email.is_empty() {
            errors.add("email", "Email is required.");
        }
        if self.firstname.is_empty() {
            errors.add("firstname", "Firstname is required.");
        }
        if self.lastname.is_empty() {
            errors.add("lastname", "Lastname is required.");
        }

        if let Err(e) = self.validate() {
            errors.merge_unset(e.into());
        }

        errors
    }
}

fn trimmed(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

fn invalid_credentials() -> ServiceError {
    ServiceError::Unauthenticated(INVALID_CREDENTIALS.to_string())
}

/// Checks role and password rules of a registration
///
/// Returns the collected errors and the requested role when it is valid.
fn registration_errors(input: &RegisterInput) -> (FieldErrors, Option<Role>) {
    let mut errors = FieldErrors::new();

    let role = match non_blank(input.role.as_deref()) {
        None => {
            errors.add("role", "Role is required");
            None
        }
        Some(tag) => {
            let role = Role::parse(tag);
            if role.is_none() {
                errors.add("role", format!("This role ({}) not allowed", tag.to_uppercase()));
            }
            role
        }
    };

    let password = input.password.as_deref().unwrap_or_default();
    if password.is_empty() {
        errors.add("password", "Password is required.");
    } else if !password_length_ok(password) {
        errors.add("password", "Password must be between 8 and 50 characters.");
    }

    let confirm = input.confirm_password.as_deref().unwrap_or_default();
    if confirm.is_empty() {
        errors.add("confirm_password", "Confirm password is required.");
    } else if confirm != password {
        errors.add("confirm_password", "Passwords do not match.");
    }

    (errors, role)
}

/// Checks a password change against the stored hash
fn password_change_errors(
    input: &ChangePasswordInput,
    current_hash: &str,
) -> Result<FieldErrors, PasswordError> {
    let mut errors = FieldErrors::new();

    let old = input.old_password.as_deref().unwrap_or_default();
    if old.is_empty() {
        errors.add("old_password", "Current password is required.");
    } else if !verify_password(old, current_hash)? {
        errors.add("old_password", "Current password is incorrect.");
    }

    let new = input.new_password.as_deref().unwrap_or_default();
    if new.is_empty() {
        errors.add("new_password", "New password is required.");
    } else if !password_length_ok(new) {
        errors.add("new_password", "New password must be between 8 and 50 characters.");
    }

    let confirm = input.confirm_password.as_deref().unwrap_or_default();
    if confirm.is_empty() {
        errors.add("confirm_password", "Confirm password is required.");
    } else if confirm != new {
        errors.add("confirm_password", "New passwords do not match.");
    }

    if !new.is_empty() && new == old {
        errors.add("new_password", "New password must be different from current password.");
    }

    Ok(errors)
}

async fn email_taken(pool: &PgPool, email: &str, except: Option<Uuid>) -> Result<bool, sqlx::Error> {
    let existing = User::find_by_email(pool, email).await?;
    Ok(existing.is_some_and(|user| Some(user.id) != except))
}

/// Verifies credentials and issues a bearer token
///
/// # Errors
///
/// `Unauthenticated` with [`INVALID_CREDENTIALS`] for blank fields, unknown
/// email or wrong password
pub async fn login(pool: &PgPool, settings: &TokenSettings, input: LoginInput) -> ServiceResult<Session> {
    let email = trimmed(input.email.as_deref());
    let password = input.password.unwrap_or_default();

    if email.is_empty() || password.is_empty() {
        warn!("Login rejected: missing credentials");
        return Err(invalid_credentials());
    }

    let Some(user) = User::find_by_email(pool, &email).await? else {
        warn!("Login rejected: unknown email");
        return Err(invalid_credentials());
    };

    match verify_password(&password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            warn!(user_id = %user.id, "Login rejected: wrong password");
            return Err(invalid_credentials());
        }
        Err(e) => {
            error!(user_id = %user.id, error = %e, "Stored password hash is unreadable");
            return Err(invalid_credentials());
        }
    }

    let claims = Claims::new(user.id, &user.role_set(), settings.ttl);
    let token = create_token(&claims, &settings.secret)?;

    info!(user_id = %user.id, "User logged in");

    Ok(Session {
        user_id: user.id,
        token,
    })
}

/// Resolves a bearer token to the current user
///
/// The user is reloaded on every call, so deleted accounts and changed roles
/// take effect immediately.
pub async fn resolve_current_user(
    pool: &PgPool,
    secret: &str,
    token: &str,
) -> Result<AuthContext, AuthError> {
    let claims = validate_token(token, secret).map_err(|e| {
        warn!(error = %e, "Bearer token rejected");
        AuthError::InvalidToken(e.to_string())
    })?;

    let user = User::find_by_id(pool, claims.sub)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?
        .ok_or_else(|| {
            warn!(user_id = %claims.sub, "Bearer token names a missing user");
            AuthError::UnknownUser
        })?;

    Ok(AuthContext::from_user(&user))
}

/// Returns the caller's own account
///
/// # Errors
///
/// `Forbidden` when `user_id` is not the caller, `NotFound` if the account
/// vanished
pub async fn get_current_user(pool: &PgPool, auth: &AuthContext, user_id: Uuid) -> ServiceResult<User> {
    require_self(auth, user_id)?;

    User::find_by_id(pool, user_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
}

/// Registers a shopper or vendor account
///
/// Every failing rule is reported at once.
pub async fn register(pool: &PgPool, input: RegisterInput) -> ServiceResult<User> {
    let (mut errors, role) = registration_errors(&input);

    let fields = AccountFields {
        email: trimmed(input.email.as_deref()),
        firstname: trimmed(input.firstname.as_deref()),
        lastname: trimmed(input.lastname.as_deref()),
    };
    errors.merge(fields.check());

    if !errors.contains("email") && email_taken(pool, &fields.email, None).await? {
        errors.add("email", "This email is already registered.");
    }

    errors.into_result()?;

    let role = role.ok_or_else(|| FieldErrors::single("role", "Role is required"))?;
    let password = input.password.unwrap_or_default();

    let user = User::create(
        pool,
        CreateUser {
            email: fields.email,
            password_hash: hash_password(&password)?,
            firstname: fields.firstname,
            lastname: fields.lastname,
            avatar: None,
            roles: vec![role.as_str().to_string()],
        },
    )
    .await?;

    info!(user_id = %user.id, role = role.as_str(), "User registered");

    Ok(user)
}

/// Edits the caller's profile
pub async fn update_profile(pool: &PgPool, auth: &AuthContext, input: ProfileInput) -> ServiceResult<User> {
    require_any_role(auth)?;

    let user = User::find_by_id(pool, auth.user_id)
        .await?
        .ok_or_else(|| ServiceError::Unauthenticated("Unauthenticated user.".to_string()))?;

    let email = input.email.as_deref().map(|v| v.trim().to_string());
    let firstname = input.firstname.as_deref().map(|v| v.trim().to_string());
    let lastname = input.lastname.as_deref().map(|v| v.trim().to_string());

    let fields = AccountFields {
        email: email.clone().unwrap_or_else(|| user.email.clone()),
        firstname: firstname.clone().unwrap_or_else(|| user.firstname.clone()),
        lastname: lastname.clone().unwrap_or_else(|| user.lastname.clone()),
    };
    let mut errors = fields.check();

    if email.is_some() && !errors.contains("email") && email_taken(pool, &fields.email, Some(user.id)).await? {
        errors.add("email", "This email is already registered.");
    }

    errors.into_result()?;

    let avatar = input
        .avatar
        .map(|a| non_blank(Some(a.as_str())).map(str::to_string));

    let update = UpdateUser {
        email,
        firstname,
        lastname,
        avatar,
        ..Default::default()
    };

    let updated = User::update(pool, user.id, update)
        .await?
        .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

    info!(user_id = %updated.id, "Profile updated");

    Ok(updated)
}

/// Changes the caller's password
pub async fn change_password(
    pool: &PgPool,
    auth: &AuthContext,
    input: ChangePasswordInput,
) -> ServiceResult<()> {
    require_any_role(auth)?;

    let user = User::find_by_id(pool, auth.user_id)
        .await?
        .ok_or_else(|| ServiceError::Unauthenticated("Unauthenticated user.".to_string()))?;

    password_change_errors(&input, &user.password_hash)?.into_result()?;

    let new_password = input.new_password.unwrap_or_default();
    let update = UpdateUser {
        password_hash: Some(hash_password(&new_password)?),
        ..Default::default()
    };

    User::update(pool, user.id, update)
        .await?
        .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

    info!(user_id = %user.id, "Password changed");

    Ok(())
}

/// Deletes the caller's account with everything it owns
pub async fn delete_account(pool: &PgPool, auth: &AuthContext) -> ServiceResult<()> {
    require_any_role(auth)?;

    if !User::delete(pool, auth.user_id).await? {
        return Err(ServiceError::NotFound("User not found".to_string()));
    }

    info!(user_id = %auth.user_id, "Account deleted");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_registration() -> RegisterInput {
        RegisterInput {
            firstname: Some("Sam".to_string()),
            lastname: Some("Shopper".to_string()),
            email: Some("sam@example.com".to_string()),
            password: Some("password123".to_string()),
            confirm_password: Some("password123".to_string()),
            role: Some("role_user".to_string()),
        }
    }

    #[test]
    fn test_registration_accepts_valid_input() {
        let (errors, role) = registration_errors(&valid_registration());
        assert!(errors.is_empty());
        assert_eq!(role, Some(Role::Shopper));
    }

    #[test]
    fn test_registration_role_rules() {
        let input = RegisterInput {
            role: None,
            ..valid_registration()
        };
        let (errors, role) = registration_errors(&input);
        assert_eq!(errors.get("role").unwrap(), ["Role is required".to_string()]);
        assert!(role.is_none());

        let input = RegisterInput {
            role: Some("role_admin".to_string()),
            ..valid_registration()
        };
        let (errors, _) = registration_errors(&input);
        assert_eq!(
            errors.get("role").unwrap(),
            ["This role (ROLE_ADMIN) not allowed".to_string()]
        );
    }

    #[test]
    fn test_registration_password_rules() {
        let input = RegisterInput {
            password: None,
            confirm_password: None,
            ..valid_registration()
        };
        let (errors, _) = registration_errors(&input);
        assert_eq!(errors.get("password").unwrap(), ["Password is required.".to_string()]);
        assert_eq!(
            errors.get("confirm_password").unwrap(),
            ["Confirm password is required.".to_string()]
        );

        let input = RegisterInput {
            password: Some("short".to_string()),
            confirm_password: Some("shorter".to_string()),
            ..valid_registration()
        };
        let (errors, _) = registration_errors(&input);
        assert_eq!(
            errors.get("password").unwrap(),
            ["Password must be between 8 and 50 characters.".to_string()]
        );
        assert_eq!(
            errors.get("confirm_password").unwrap(),
            ["Passwords do not match.".to_string()]
        );
    }

    #[test]
    fn test_account_fields() {
        let fields = AccountFields {
            email: String::new(),
            firstname: String::new(),
            lastname: "x".repeat(256),
        };
        let errors = fields.check();

        assert_eq!(errors.get("email").unwrap(), ["Email is required.".to_string()]);
        assert_eq!(errors.get("firstname").unwrap(), ["Firstname is required.".to_string()]);
        assert_eq!(
            errors.get("lastname").unwrap(),
            ["Lastname cannot be longer than 255 characters.".to_string()]
        );

        let fields = AccountFields {
            email: "not-an-email".to_string(),
            firstname: "Sam".to_string(),
            lastname: "Shopper".to_string(),
        };
        let errors = fields.check();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get("email").unwrap(),
            ["Please enter a valid email address.".to_string()]
        );
    }

    #[test]
    fn test_password_change_rules() {
        let hash = hash_password("current-password").unwrap();

        let input = ChangePasswordInput::default();
        let errors = password_change_errors(&input, &hash).unwrap();
        assert!(errors.contains("old_password"));
        assert!(errors.contains("new_password"));
        assert!(errors.contains("confirm_password"));

        let input = ChangePasswordInput {
            old_password: Some("wrong-password".to_string()),
            new_password: Some("next-password".to_string()),
            confirm_password: Some("other-password".to_string()),
        };
        let errors = password_change_errors(&input, &hash).unwrap();
        assert_eq!(
            errors.get("old_password").unwrap(),
            ["Current password is incorrect.".to_string()]
        );
        assert_eq!(
            errors.get("confirm_password").unwrap(),
            ["New passwords do not match.".to_string()]
        );

        let input = ChangePasswordInput {
            old_password: Some("current-password".to_string()),
            new_password: Some("current-password".to_string()),
            confirm_password: Some("current-password".to_string()),
        };
        let errors = password_change_errors(&input, &hash).unwrap();
        assert_eq!(
            errors.get("new_password").unwrap(),
            ["New password must be different from current password.".to_string()]
        );

        let input = ChangePasswordInput {
            old_password: Some("current-password".to_string()),
            new_password: Some("next-password".to_string()),
            confirm_password: Some("next-password".to_string()),
        };
        assert!(password_change_errors(&input, &hash).unwrap().is_empty());
    }

    #[test]
    fn test_token_settings() {
        let settings = TokenSettings::new("secret", 120);
        assert_eq!(settings.ttl.num_seconds(), 120);
    }
}
