/// User model and database operations
///
/// Users are either shoppers (`ROLE_USER`) or vendors (`ROLE_VENDOR`). Role
/// tags are stored as a text array; a user normally holds exactly one.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(180) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     firstname VARCHAR(255) NOT NULL,
///     lastname VARCHAR(255) NOT NULL,
///     avatar VARCHAR(512),
///     roles TEXT[] NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// CREATE UNIQUE INDEX users_email_lower_idx ON users (LOWER(email));
/// ```
///
/// # Example
///
/// ```no_run
/// use storefront_shared::models::user::{CreateUser, Role, User};
/// use storefront_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     email: "vendor@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     firstname: "Ada".to_string(),
///     lastname: "Lovelace".to_string(),
///     avatar: None,
///     roles: vec![Role::Vendor.as_str().to_string()],
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// assert!(user.has_role(Role::Vendor));
///
/// // Lookups by email ignore case
/// let found = User::find_by_email(&pool, "VENDOR@example.com").await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Account roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Browses the catalog and places orders
    #[serde(rename = "ROLE_USER")]
    Shopper,

    /// Owns products and manages orders placed on them
    #[serde(rename = "ROLE_VENDOR")]
    Vendor,
}

impl Role {
    /// Role tag as stored and exchanged
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Shopper => "ROLE_USER",
            Role::Vendor => "ROLE_VENDOR",
        }
    }

    /// Parses a role tag, ignoring case and surrounding whitespace
    ///
    /// # Example
    ///
    /// ```
    /// use storefront_shared::models::user::Role;
    ///
    /// assert_eq!(Role::parse("role_vendor"), Some(Role::Vendor));
    /// assert_eq!(Role::parse("ROLE_ADMIN"), None);
    /// ```
    pub fn parse(tag: &str) -> Option<Role> {
        match tag.trim().to_uppercase().as_str() {
            "ROLE_USER" => Some(Role::Shopper),
            "ROLE_VENDOR" => Some(Role::Vendor),
            _ => None,
        }
    }
}

/// User account
///
/// Passwords are stored as Argon2id hashes, never in plaintext. The hash is
/// never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Email address, unique regardless of case
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub firstname: String,

    pub lastname: String,

    /// Opaque avatar reference
    pub avatar: Option<String>,

    /// Role tags (`ROLE_USER`, `ROLE_VENDOR`)
    pub roles: Vec<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Roles this user holds; unknown tags are ignored
    pub fn role_set(&self) -> Vec<Role> {
        self.roles.iter().filter_map(|tag| Role::parse(tag)).collect()
    }

    /// Checks whether this user holds a role
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.iter().any(|tag| Role::parse(tag) == Some(role))
    }
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,

    pub firstname: String,

    pub lastname: String,

    pub avatar: Option<String>,

    pub roles: Vec<String>,
}

/// Input for updating an existing user
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    pub email: Option<String>,

    pub password_hash: Option<String>,

    pub firstname: Option<String>,

    pub lastname: Option<String>,

    /// New avatar reference (use Some(None) to clear)
    pub avatar: Option<Option<String>>,
}

impl UpdateUser {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.password_hash.is_none()
            && self.firstname.is_none()
            && self.lastname.is_none()
            && self.avatar.is_none()
    }
}

impl User {
    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Email already exists in any letter case (unique index violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, firstname, lastname, avatar, roles)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, email, password_hash, firstname, lastname, avatar, roles,
                      created_at, updated_at
            "#,
        )
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.firstname)
        .bind(data.lastname)
        .bind(data.avatar)
        .bind(data.roles)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use storefront_shared::models::user::User;
    /// # use sqlx::PgPool;
    /// # use uuid::Uuid;
    /// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
    /// if let Some(user) = User::find_by_id(&pool, user_id).await? {
    ///     println!("Found user: {}", user.email);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, firstname, lastname, avatar, roles,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address, ignoring case
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, firstname, lastname, avatar, roles,
                   created_at, updated_at
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Updates an existing user
    ///
    /// Only non-None fields in `data` will be updated. The `updated_at`
    /// timestamp is always refreshed.
    ///
    /// # Returns
    ///
    /// The updated user if found, None if user doesn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if the new email belongs to another user or the
    /// database connection fails
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        if data.password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", password_hash = ${}", bind_count));
        }
        if data.firstname.is_some() {
            bind_count += 1;
            query.push_str(&format!(", firstname = ${}", bind_count));
        }
        if data.lastname.is_some() {
            bind_count += 1;
            query.push_str(&format!(", lastname = ${}", bind_count));
        }
        if data.avatar.is_some() {
            bind_count += 1;
            query.push_str(&format!(", avatar = ${}", bind_count));
        }

        query.push_str(" WHERE id = $1 RETURNING id, email, password_hash, firstname, lastname, avatar, roles, created_at, updated_at");

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }
        if let Some(firstname) = data.firstname {
            q = q.bind(firstname);
        }
        if let Some(lastname) = data.lastname {
            q = q.bind(lastname);
        }
        if let Some(avatar) = data.avatar {
            q = q.bind(avatar);
        }

        let user = q.fetch_optional(pool).await?;

        Ok(user)
    }

    /// Deletes a user by ID
    ///
    /// Foreign keys cascade: the user's products, orders placed on those
    /// products and orders the user placed are removed with it.
    ///
    /// # Returns
    ///
    /// True if user was deleted, false if user didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
