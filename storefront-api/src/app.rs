/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use storefront_api::{app::AppState, config::Config};
/// use storefront_shared::db::pool::create_pool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(config.pool_config()).await?;
/// let state = AppState::new(pool, config);
/// let app = storefront_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use storefront_shared::{auth::middleware::bearer_token, services::identity};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// └── /api/
///     ├── POST /login                  # public
///     ├── POST /register               # public
///     ├── GET  /user/products          # public catalog
///     ├── GET  /current-user/:id       # bearer
///     ├── PUT  /user/profile           # bearer
///     ├── PUT  /user/change-password   # bearer
///     ├── DELETE /user/delete/my-account
///     ├── /products                    # bearer, vendor
///     │   ├── GET, POST /
///     │   ├── GET /count/vendor
///     │   └── GET, PUT, DELETE /:id
///     └── /commands                    # bearer
///         ├── GET, POST /              # shopper
///         ├── PATCH, DELETE /:id       # shopper
///         ├── GET /vendor/list         # vendor
///         ├── GET /count/vendor        # vendor
///         └── POST /:id/confirm|cancel|pending
/// ```
///
/// # Middleware Stack
///
/// 1. Bearer authentication (protected routes only)
/// 2. Logging (tower-http TraceLayer)
/// 3. CORS (tower-http CorsLayer)
/// 4. Security headers
pub fn build_router(state: AppState) -> Router {
    use crate::routes::{auth, health, orders, products, users};

    let public_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/user/products", get(users::public_products));

    let protected_routes = Router::new()
        .route("/current-user/:id", get(users::current_user))
        .route("/user/profile", put(users::update_profile))
        .route("/user/change-password", put(users::change_password))
        .route("/user/delete/my-account", axum::routing::delete(users::delete_account))
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route("/products/count/vendor", get(products::count_products))
        .route(
            "/products/:id",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route(
            "/commands",
            get(orders::list_orders).post(orders::create_order),
        )
        .route("/commands/vendor/list", get(orders::vendor_orders))
        .route("/commands/count/vendor", get(orders::vendor_count))
        .route(
            "/commands/:id",
            patch(orders::update_order).delete(orders::delete_order),
        )
        .route("/commands/:id/confirm", post(orders::confirm_order))
        .route("/commands/:id/cancel", post(orders::cancel_order))
        .route("/commands/:id/pending", post(orders::pending_order))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let api_routes = Router::new().merge(public_routes).merge(protected_routes);

    // Configure CORS based on environment
    let cors = if state.config.cors_permissive() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Bearer authentication layer
///
/// Validates the token, reloads its user and injects the resulting
/// `AuthContext` into request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())?;

    let auth_context = identity::resolve_current_user(&state.db, state.jwt_secret(), token).await?;

    tracing::debug!(user_id = %auth_context.user_id, "Request authenticated");

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
