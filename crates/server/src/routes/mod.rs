//! HTTP route handlers for the catalog server.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                      - Liveness check
//! GET    /health/ready                - Readiness check (pings the database)
//!
//! # Auth
//! POST   /auth/login                  - Login, returns a bearer token
//!
//! # Users
//! POST   /user/register               - Register a seller or customer account
//! GET    /user/sellers                - List sellers (administrator)
//!
//! # Products
//! GET    /product?category=           - Active products, cached (public)
//! POST   /product/create              - Create a product (seller)
//! GET    /product/my-products         - Caller's own products (seller)
//! GET    /product/admin-products?sellerId= - All products (administrator)
//! PUT    /product/update/{id}         - Partial update (owner or administrator)
//! DELETE /product/delete/{id}         - Delete (owner or administrator)
//!
//! # Categories
//! GET    /category                    - List categories (public)
//! ```

pub mod auth;
pub mod categories;
pub mod products;
pub mod users;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(auth::login))
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(users::register))
        .route("/sellers", get(users::sellers))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list_available))
        .route("/create", post(products::create))
        .route("/my-products", get(products::my_products))
        .route("/admin-products", get(products::admin_products))
        .route("/update/{id}", put(products::update))
        .route("/delete/{id}", delete(products::delete))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new().route("/", get(categories::list))
}

/// Create all routes for the catalog server.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/user", user_routes())
        .nest("/product", product_routes())
        .nest("/category", category_routes())
}
