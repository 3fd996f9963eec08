/// Catalog operations
///
/// Vendors manage their own products; anyone may read the public catalog.
/// Every management operation checks, in order: the caller is a vendor, the
/// product exists, the caller owns it.

use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{ServiceError, ServiceResult};
use crate::auth::{
    authorization::{require_product_owner, require_role},
    middleware::AuthContext,
};
use crate::models::{
    product::{CreateProduct, Product, ProductWithOwner, UpdateProduct},
    user::Role,
};
use crate::validation::{coerce_price, non_blank, FieldErrors};

/// Submitted product fields
///
/// `price` is kept raw so numeric strings and junk can be coerced.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Value>,
    pub image: Option<String>,
}

#[derive(Debug, Validate)]
struct ProductFields {
    #[validate(length(max = 255, message = "Product name cannot be longer than 255 characters."))]
    name: String,

    #[validate(range(min = 0.0, message = "Price must be a positive number or zero."))]
    price: f64,

    #[validate(length(max = 512, message = "Image reference cannot be longer than 512 characters."))]
    image: String,
}

impl ProductFields {
    fn check(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if self.name.is_empty() {
            errors.add("name", "Product name is required.");
        }

        if let Err(e) = self.validate() {
            errors.merge_unset(e.into());
        }

        errors
    }
}

fn product_not_found() -> ServiceError {
    ServiceError::NotFound("Product not found".to_string())
}

async fn load_owned(pool: &PgPool, auth: &AuthContext, product_id: Uuid) -> ServiceResult<Product> {
    require_role(auth, Role::Vendor)?;

    let product = Product::find_by_id(pool, product_id)
        .await?
        .ok_or_else(product_not_found)?;

    require_product_owner(auth, &product)?;

    Ok(product)
}

/// Lists the caller's products, newest first
pub async fn list_owned(pool: &PgPool, auth: &AuthContext) -> ServiceResult<Vec<Product>> {
    require_role(auth, Role::Vendor)?;

    Ok(Product::list_by_owner(pool, auth.user_id).await?)
}

/// Lists every product with its owner, newest first
pub async fn list_public(pool: &PgPool) -> ServiceResult<Vec<ProductWithOwner>> {
    Ok(Product::list_all_with_owner(pool).await?)
}

/// Returns one of the caller's products
pub async fn get_owned(pool: &PgPool, auth: &AuthContext, product_id: Uuid) -> ServiceResult<Product> {
    load_owned(pool, auth, product_id).await
}

/// Creates a product owned by the caller
///
/// A missing, empty or non-numeric price becomes 0.
pub async fn create(pool: &PgPool, auth: &AuthContext, input: ProductInput) -> ServiceResult<Product> {
    require_role(auth, Role::Vendor)?;

    let fields = ProductFields {
        name: input.name.as_deref().map(str::trim).unwrap_or_default().to_string(),
        price: coerce_price(input.price.as_ref()),
        image: input.image.unwrap_or_default(),
    };
    fields.check().into_result()?;

    let product = Product::create(
        pool,
        CreateProduct {
            owner_id: auth.user_id,
            name: fields.name,
            description: non_blank(input.description.as_deref()).map(str::to_string),
            price: fields.price,
            image: fields.image,
        },
    )
    .await?;

    info!(product_id = %product.id, owner_id = %auth.user_id, "Product created");

    Ok(product)
}

/// Updates one of the caller's products
///
/// Absent fields keep their value; a present non-numeric price becomes 0 and
/// an empty description clears it.
pub async fn update(
    pool: &PgPool,
    auth: &AuthContext,
    product_id: Uuid,
    input: ProductInput,
) -> ServiceResult<Product> {
    let product = load_owned(pool, auth, product_id).await?;

    let name = input.name.as_deref().map(|n| n.trim().to_string());
    let price = input.price.as_ref().map(|p| coerce_price(Some(p)));

    let fields = ProductFields {
        name: name.clone().unwrap_or_else(|| product.name.clone()),
        price: price.unwrap_or(product.price),
        image: input.image.clone().unwrap_or_else(|| product.image.clone()),
    };
    fields.check().into_result()?;

    let update = UpdateProduct {
        name,
        description: input
            .description
            .as_deref()
            .map(|d| non_blank(Some(d)).map(str::to_string)),
        price,
        image: input.image,
    };

    let updated = Product::update(pool, product.id, update)
        .await?
        .ok_or_else(product_not_found)?;

    info!(product_id = %updated.id, "Product updated");

    Ok(updated)
}

/// Deletes one of the caller's products together with its orders
pub async fn delete(pool: &PgPool, auth: &AuthContext, product_id: Uuid) -> ServiceResult<()> {
    let product = load_owned(pool, auth, product_id).await?;

    if !Product::delete(pool, product.id).await? {
        return Err(product_not_found());
    }

    info!(product_id = %product.id, "Product deleted");

    Ok(())
}

/// Counts the caller's products
pub async fn count(pool: &PgPool, auth: &AuthContext) -> ServiceResult<i64> {
    require_role(auth, Role::Vendor)?;

    Ok(Product::count_by_owner(pool, auth.user_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(name: &str, price: f64) -> ProductFields {
        ProductFields {
            name: name.to_string(),
            price,
            image: String::new(),
        }
    }

    #[test]
    fn test_valid_product_fields() {
        assert!(fields("Teapot", 0.0).check().is_empty());
        assert!(fields("Teapot", 19.99).check().is_empty());
    }

    #[test]
    fn test_product_name_rules() {
        let errors = fields("", 1.0).check();
        assert_eq!(errors.get("name").unwrap(), ["Product name is required.".to_string()]);

        let errors = fields(&"n".repeat(256), 1.0).check();
        assert_eq!(
            errors.get("name").unwrap(),
            ["Product name cannot be longer than 255 characters.".to_string()]
        );
    }

    #[test]
    fn test_negative_price_rejected() {
        let errors = fields("Teapot", -0.5).check();
        assert_eq!(
            errors.get("price").unwrap(),
            ["Price must be a positive number or zero.".to_string()]
        );
    }

    #[test]
    fn test_product_input_keeps_raw_price() {
        let input: ProductInput =
            serde_json::from_value(serde_json::json!({ "name": "Teapot", "price": "12.5" })).unwrap();

        assert_eq!(coerce_price(input.price.as_ref()), 12.5);
        assert!(input.image.is_none());
    }
}
