/// Product model and database operations
///
/// Every product belongs to exactly one vendor for its whole life. Deleting
/// the product cascades to the orders placed on it.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE products (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     price DOUBLE PRECISION NOT NULL DEFAULT 0,
///     image VARCHAR(512) NOT NULL DEFAULT '',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use storefront_shared::models::product::{CreateProduct, Product};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, vendor_id: Uuid) -> Result<(), sqlx::Error> {
/// let product = Product::create(&pool, CreateProduct {
///     owner_id: vendor_id,
///     name: "Espresso cup".to_string(),
///     description: None,
///     price: 12.5,
///     image: String::new(),
/// }).await?;
///
/// let mine = Product::list_by_owner(&pool, vendor_id).await?;
/// assert!(mine.iter().any(|p| p.id == product.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Product owned by a vendor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,

    /// Owning vendor; never changes after creation
    pub owner_id: Uuid,

    pub name: String,

    pub description: Option<String>,

    pub price: f64,

    /// Opaque image reference, possibly empty
    pub image: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Reduced projection of a product's owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductOwner {
    #[sqlx(rename = "owner_id")]
    pub id: Uuid,

    #[sqlx(rename = "owner_email")]
    pub email: String,

    #[sqlx(rename = "owner_firstname")]
    pub firstname: String,

    #[sqlx(rename = "owner_lastname")]
    pub lastname: String,
}

/// Product joined with its owner
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ProductWithOwner {
    #[sqlx(flatten)]
    pub product: Product,

    #[sqlx(flatten)]
    pub owner: ProductOwner,
}

/// Input for creating a new product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProduct {
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image: String,
}

/// Input for updating an existing product
///
/// Only non-None fields will be updated. The owner cannot be changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,

    /// New description (use Some(None) to clear)
    pub description: Option<Option<String>>,

    pub price: Option<f64>,

    pub image: Option<String>,
}

impl Product {
    /// Creates a new product
    pub async fn create(pool: &PgPool, data: CreateProduct) -> Result<Self, sqlx::Error> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (owner_id, name, description, price, image)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, owner_id, name, description, price, image, created_at, updated_at
            "#,
        )
        .bind(data.owner_id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.price)
        .bind(data.image)
        .fetch_one(pool)
        .await?;

        Ok(product)
    }

    /// Finds a product by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, owner_id, name, description, price, image, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(product)
    }

    /// Lists the products of one vendor, newest first
    pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, owner_id, name, description, price, image, created_at, updated_at
            FROM products
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(products)
    }

    /// Lists every product with its owner, newest first
    pub async fn list_all_with_owner(pool: &PgPool) -> Result<Vec<ProductWithOwner>, sqlx::Error> {
        let products = sqlx::query_as::<_, ProductWithOwner>(
            r#"
            SELECT p.id, p.owner_id, p.name, p.description, p.price, p.image,
                   p.created_at, p.updated_at,
                   u.email AS owner_email, u.firstname AS owner_firstname,
                   u.lastname AS owner_lastname
            FROM products p
            JOIN users u ON u.id = p.owner_id
            ORDER BY p.created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(products)
    }

    /// Updates an existing product
    ///
    /// # Returns
    ///
    /// The updated product if found, None if it doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProduct,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE products SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.price.is_some() {
            bind_count += 1;
            query.push_str(&format!(", price = ${}", bind_count));
        }
        if data.image.is_some() {
            bind_count += 1;
            query.push_str(&format!(", image = ${}", bind_count));
        }

        query.push_str(" WHERE id = $1 RETURNING id, owner_id, name, description, price, image, created_at, updated_at");

        let mut q = sqlx::query_as::<_, Product>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(price) = data.price {
            q = q.bind(price);
        }
        if let Some(image) = data.image {
            q = q.bind(image);
        }

        let product = q.fetch_optional(pool).await?;

        Ok(product)
    }

    /// Deletes a product and, through the foreign key, its orders
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts the products of one vendor
    pub async fn count_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
