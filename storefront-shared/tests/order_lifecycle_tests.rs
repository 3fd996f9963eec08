/// End-to-end service tests against PostgreSQL
///
/// Requires PostgreSQL; see `common/mod.rs`.

mod common;

use common::{create_account, create_product, test_pool, unique_email};
use serde_json::json;
use std::time::Duration;
use storefront_shared::auth::jwt::validate_token;
use storefront_shared::models::order::{Order, OrderStatus};
use storefront_shared::models::product::Product;
use storefront_shared::models::user::{Role, User};
use storefront_shared::services::catalog::{self, ProductInput};
use storefront_shared::services::identity::{
    self, ChangePasswordInput, LoginInput, ProfileInput, RegisterInput, TokenSettings,
    INVALID_CREDENTIALS,
};
use storefront_shared::services::orders::{self, CreateOrderInput, QuantityInput};
use storefront_shared::services::ServiceError;
use uuid::Uuid;

const SECRET: &str = "integration-secret-at-least-32-characters";

fn order_input(product: &Product, quantity: serde_json::Value) -> CreateOrderInput {
    CreateOrderInput {
        product: Some(json!(product.id.to_string())),
        quantity: Some(quantity),
    }
}

#[tokio::test]
#[ignore]
async fn test_shopper_and_vendor_lifecycle() {
    let pool = test_pool().await;
    let (shopper, shopper_auth) = create_account(&pool, Role::Shopper).await;
    let (vendor, vendor_auth) = create_account(&pool, Role::Vendor).await;
    let product = create_product(&pool, &vendor_auth, "Teapot", 10.0).await;

    // Shopper orders 3 units
    let placed = orders::create(&pool, &shopper_auth, order_input(&product, json!(3)))
        .await
        .expect("Order should be placed");
    assert_eq!(placed.order.status, OrderStatus::Pending);
    assert_eq!(placed.order.quantity, 3);
    assert_eq!(placed.shopper.id, shopper.id);
    assert_eq!(placed.vendor_id(), vendor.id);

    // Shopper raises it to 5
    let updated = orders::update_quantity(
        &pool,
        &shopper_auth,
        placed.order.id,
        QuantityInput {
            quantity: Some(json!(5)),
        },
    )
    .await
    .expect("Pending order should be editable");
    assert_eq!(updated.order.quantity, 5);

    // Vendor confirms
    let outcome = orders::confirm(&pool, &vendor_auth, placed.order.id).await.unwrap();
    assert!(outcome.changed);
    assert_eq!(outcome.status, OrderStatus::Confirmed);
    assert_eq!(outcome.message, "Order confirmed successfully.");

    // Shopper can no longer delete
    let err = orders::delete_order(&pool, &shopper_auth, placed.order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::StateConflict(ref m) if m == "Only pending orders can be deleted."));

    // Confirming again is an idempotent success
    let again = orders::confirm(&pool, &vendor_auth, placed.order.id).await.unwrap();
    assert!(!again.changed);
    assert_eq!(again.message, "Order is already confirmed.");

    let stored = Order::find_by_id(&pool, placed.order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Confirmed);
    assert_eq!(stored.quantity, 5);

    // Any state is reachable again
    let reopened = orders::mark_pending(&pool, &vendor_auth, placed.order.id).await.unwrap();
    assert_eq!(reopened.status, OrderStatus::Pending);
    orders::delete_order(&pool, &shopper_auth, placed.order.id)
        .await
        .expect("Pending order should be deletable");

    User::delete(&pool, shopper.id).await.unwrap();
    User::delete(&pool, vendor.id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_foreign_vendor_cannot_set_status() {
    let pool = test_pool().await;
    let (shopper, shopper_auth) = create_account(&pool, Role::Shopper).await;
    let (vendor_b, vendor_b_auth) = create_account(&pool, Role::Vendor).await;
    let (vendor_c, vendor_c_auth) = create_account(&pool, Role::Vendor).await;
    let product = create_product(&pool, &vendor_c_auth, "Kettle", 25.0).await;

    let placed = orders::create(&pool, &shopper_auth, order_input(&product, json!("2")))
        .await
        .unwrap();

    let err = orders::cancel(&pool, &vendor_b_auth, placed.order.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    // Shoppers cannot set status at all
    let err = orders::confirm(&pool, &shopper_auth, placed.order.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let vendor_b_orders = orders::list_for_vendor(&pool, &vendor_b_auth).await.unwrap();
    assert!(vendor_b_orders.is_empty());
    assert_eq!(orders::count_for_vendor(&pool, &vendor_c_auth).await.unwrap(), 1);

    for id in [shopper.id, vendor_b.id, vendor_c.id] {
        User::delete(&pool, id).await.unwrap();
    }
}

#[tokio::test]
#[ignore]
async fn test_order_creation_edge_cases() {
    let pool = test_pool().await;
    let (shopper, shopper_auth) = create_account(&pool, Role::Shopper).await;
    let (vendor, vendor_auth) = create_account(&pool, Role::Vendor).await;
    let product = create_product(&pool, &vendor_auth, "Cup", 3.0).await;

    let err = orders::create(&pool, &shopper_auth, CreateOrderInput::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(ref e) if e.contains("product")));

    let missing = CreateOrderInput {
        product: Some(json!(Uuid::new_v4().to_string())),
        quantity: None,
    };
    let err = orders::create(&pool, &shopper_auth, missing).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let defaulted = orders::create(&pool, &shopper_auth, order_input(&product, json!("lots")))
        .await
        .unwrap();
    assert_eq!(defaulted.order.quantity, 1);

    let err = orders::create(&pool, &shopper_auth, order_input(&product, json!(-4)))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(ref e) if e.contains("quantity")));

    // Edits without a quantity are rejected and leave the order intact
    let err = orders::update_quantity(&pool, &shopper_auth, defaulted.order.id, QuantityInput::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    // Vendors cannot place orders
    let err = orders::create(&pool, &vendor_auth, order_input(&product, json!(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let mine = orders::list_for_shopper(&pool, &shopper_auth).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].order.quantity, 1);

    User::delete(&pool, shopper.id).await.unwrap();
    User::delete(&pool, vendor.id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_other_shopper_cannot_touch_order() {
    let pool = test_pool().await;
    let (owner, owner_auth) = create_account(&pool, Role::Shopper).await;
    let (other, other_auth) = create_account(&pool, Role::Shopper).await;
    let (vendor, vendor_auth) = create_account(&pool, Role::Vendor).await;
    let product = create_product(&pool, &vendor_auth, "Plate", 8.0).await;

    let placed = orders::create(&pool, &owner_auth, order_input(&product, json!(1)))
        .await
        .unwrap();

    let err = orders::update_quantity(
        &pool,
        &other_auth,
        placed.order.id,
        QuantityInput {
            quantity: Some(json!(9)),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let err = orders::delete_order(&pool, &other_auth, placed.order.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let err = orders::delete_order(&pool, &owner_auth, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    for id in [owner.id, other.id, vendor.id] {
        User::delete(&pool, id).await.unwrap();
    }
}

#[tokio::test]
#[ignore]
async fn test_catalog_ownership() {
    let pool = test_pool().await;
    let (owner, owner_auth) = create_account(&pool, Role::Vendor).await;
    let (rival, rival_auth) = create_account(&pool, Role::Vendor).await;
    let product = create_product(&pool, &owner_auth, "Lamp", 40.0).await;

    let err = catalog::get_owned(&pool, &rival_auth, product.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let err = catalog::delete(&pool, &rival_auth, product.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let err = catalog::get_owned(&pool, &owner_auth, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    // Partial update keeps absent fields; junk price becomes 0
    let updated = catalog::update(
        &pool,
        &owner_auth,
        product.id,
        ProductInput {
            name: None,
            description: Some("Brass desk lamp".to_string()),
            price: Some(json!("expensive")),
            image: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.name, "Lamp");
    assert_eq!(updated.description.as_deref(), Some("Brass desk lamp"));
    assert_eq!(updated.price, 0.0);

    let err = catalog::update(
        &pool,
        &owner_auth,
        product.id,
        ProductInput {
            price: Some(json!(-1)),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(ref e) if e.contains("price")));

    assert_eq!(catalog::count(&pool, &owner_auth).await.unwrap(), 1);
    assert_eq!(catalog::count(&pool, &rival_auth).await.unwrap(), 0);
    assert_eq!(catalog::list_owned(&pool, &owner_auth).await.unwrap().len(), 1);

    let public = catalog::list_public(&pool).await.unwrap();
    let listed = public.iter().find(|p| p.product.id == product.id).unwrap();
    assert_eq!(listed.owner.id, owner.id);

    catalog::delete(&pool, &owner_auth, product.id).await.unwrap();
    assert!(Product::find_by_id(&pool, product.id).await.unwrap().is_none());

    User::delete(&pool, owner.id).await.unwrap();
    User::delete(&pool, rival.id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_account_deletion_cascades() {
    let pool = test_pool().await;
    let (shopper, shopper_auth) = create_account(&pool, Role::Shopper).await;
    let (vendor, vendor_auth) = create_account(&pool, Role::Vendor).await;
    let product = create_product(&pool, &vendor_auth, "Vase", 15.0).await;

    let placed = orders::create(&pool, &shopper_auth, order_input(&product, json!(2)))
        .await
        .unwrap();

    identity::delete_account(&pool, &vendor_auth).await.unwrap();

    assert!(User::find_by_id(&pool, vendor.id).await.unwrap().is_none());
    assert!(Product::find_by_id(&pool, product.id).await.unwrap().is_none());
    assert!(Order::find_by_id(&pool, placed.order.id).await.unwrap().is_none());

    User::delete(&pool, shopper.id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_shopper_deletion_removes_their_orders() {
    let pool = test_pool().await;
    let (leaving, leaving_auth) = create_account(&pool, Role::Shopper).await;
    let (staying, staying_auth) = create_account(&pool, Role::Shopper).await;
    let (vendor, vendor_auth) = create_account(&pool, Role::Vendor).await;
    let product = create_product(&pool, &vendor_auth, "Lamp", 30.0).await;

    let gone = orders::create(&pool, &leaving_auth, order_input(&product, json!(1)))
        .await
        .unwrap();
    let kept = orders::create(&pool, &staying_auth, order_input(&product, json!(2)))
        .await
        .unwrap();
    assert_eq!(orders::count_for_vendor(&pool, &vendor_auth).await.unwrap(), 2);

    identity::delete_account(&pool, &leaving_auth).await.unwrap();

    assert!(User::find_by_id(&pool, leaving.id).await.unwrap().is_none());
    assert!(Order::find_by_id(&pool, gone.order.id).await.unwrap().is_none());
    assert!(Order::find_by_id(&pool, kept.order.id).await.unwrap().is_some());
    assert!(Product::find_by_id(&pool, product.id).await.unwrap().is_some());
    assert_eq!(orders::count_for_vendor(&pool, &vendor_auth).await.unwrap(), 1);

    let listed = orders::list_for_vendor(&pool, &vendor_auth).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].shopper.id, staying.id);

    User::delete(&pool, staying.id).await.unwrap();
    User::delete(&pool, vendor.id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_lists_are_newest_first() {
    let pool = test_pool().await;
    let (shopper, shopper_auth) = create_account(&pool, Role::Shopper).await;
    let (vendor, vendor_auth) = create_account(&pool, Role::Vendor).await;

    let older = create_product(&pool, &vendor_auth, "Older", 5.0).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    let newer = create_product(&pool, &vendor_auth, "Newer", 6.0).await;

    let first = orders::create(&pool, &shopper_auth, order_input(&older, json!(1)))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    let second = orders::create(&pool, &shopper_auth, order_input(&newer, json!(1)))
        .await
        .unwrap();

    let owned = catalog::list_owned(&pool, &vendor_auth).await.unwrap();
    assert_eq!(owned.len(), 2);
    assert_eq!(owned[0].id, newer.id);
    assert_eq!(owned[1].id, older.id);

    // Other tests share the database, so compare positions only
    let public = catalog::list_public(&pool).await.unwrap();
    let position = |id: Uuid| public.iter().position(|p| p.product.id == id).unwrap();
    assert!(position(newer.id) < position(older.id));

    let placed = orders::list_for_shopper(&pool, &shopper_auth).await.unwrap();
    assert_eq!(placed.len(), 2);
    assert_eq!(placed[0].order.id, second.order.id);
    assert_eq!(placed[1].order.id, first.order.id);

    let received = orders::list_for_vendor(&pool, &vendor_auth).await.unwrap();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].order.id, second.order.id);
    assert_eq!(received[1].order.id, first.order.id);

    User::delete(&pool, shopper.id).await.unwrap();
    User::delete(&pool, vendor.id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_register_login_and_account_management() {
    let pool = test_pool().await;
    let settings = TokenSettings::new(SECRET, 600);
    let email = unique_email("flow");

    let user = identity::register(
        &pool,
        RegisterInput {
            firstname: Some("Ada".to_string()),
            lastname: Some("Lovelace".to_string()),
            email: Some(email.clone()),
            password: Some("first-password".to_string()),
            confirm_password: Some("first-password".to_string()),
            role: Some("ROLE_VENDOR".to_string()),
        },
    )
    .await
    .expect("Registration should succeed");
    assert!(user.has_role(Role::Vendor));

    // Same email in another case is taken
    let err = identity::register(
        &pool,
        RegisterInput {
            firstname: Some("Ada".to_string()),
            lastname: Some("Again".to_string()),
            email: Some(email.to_uppercase()),
            password: Some("first-password".to_string()),
            confirm_password: Some("first-password".to_string()),
            role: Some("ROLE_USER".to_string()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(ref e) if e.contains("email")));

    // Wrong password and unknown email share one message
    for (login_email, password) in [(email.as_str(), "wrong-password"), ("nobody@example.com", "whatever")] {
        let err = identity::login(
            &pool,
            &settings,
            LoginInput {
                email: Some(login_email.to_string()),
                password: Some(password.to_string()),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthenticated(ref m) if m == INVALID_CREDENTIALS));
    }

    let session = identity::login(
        &pool,
        &settings,
        LoginInput {
            email: Some(email.clone()),
            password: Some("first-password".to_string()),
        },
    )
    .await
    .expect("Login should succeed");
    assert_eq!(session.user_id, user.id);
    assert_eq!(validate_token(&session.token, SECRET).unwrap().sub, user.id);

    let auth = identity::resolve_current_user(&pool, SECRET, &session.token)
        .await
        .expect("Token should resolve");
    assert_eq!(auth.user_id, user.id);
    assert!(auth.has_role(Role::Vendor));

    let err = identity::get_current_user(&pool, &auth, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(ref m) if m == "Access denied: token mismatch."));
    assert_eq!(identity::get_current_user(&pool, &auth, user.id).await.unwrap().id, user.id);

    let profile = identity::update_profile(
        &pool,
        &auth,
        ProfileInput {
            firstname: Some("Augusta".to_string()),
            avatar: Some("avatars/ada.png".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(profile.firstname, "Augusta");
    assert_eq!(profile.lastname, "Lovelace");
    assert_eq!(profile.avatar.as_deref(), Some("avatars/ada.png"));

    identity::change_password(
        &pool,
        &auth,
        ChangePasswordInput {
            old_password: Some("first-password".to_string()),
            new_password: Some("second-password".to_string()),
            confirm_password: Some("second-password".to_string()),
        },
    )
    .await
    .expect("Password change should succeed");

    let relogin = identity::login(
        &pool,
        &settings,
        LoginInput {
            email: Some(email.clone()),
            password: Some("second-password".to_string()),
        },
    )
    .await;
    assert!(relogin.is_ok());

    identity::delete_account(&pool, &auth).await.unwrap();

    // Tokens of deleted accounts no longer resolve
    assert!(identity::resolve_current_user(&pool, SECRET, &session.token).await.is_err());
}
