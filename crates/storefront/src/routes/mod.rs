//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (slider placeholder)
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (backend reachable)
//!
//! # Products
//! GET  /products               - All products (optional ?q= filter)
//! GET  /products/slider        - Slider fragment (client-hint aware)
//! GET  /product/{id}           - Product detail with add-to-cart form
//! GET  /category/{slug}        - Category page
//! GET  /images/{id}            - Product image proxy
//!
//! # Cart (POST-redirect-GET)
//! GET  /cart                   - Cart page
//! GET  /cart/{user_id}         - Cart page (user id is trace-only)
//! POST /cart/add               - Add to cart, toast, 303 to /cart
//! POST /cart/update            - Increment/decrement a line, toast, 303 to /cart
//! POST /cart/remove            - Remove a line, toast, 303 to /cart
//! ```

pub mod cart;
pub mod category;
pub mod health;
pub mod home;
pub mod images;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};
use tower_sessions::Session;

use crate::models::{LayoutView, take_toasts};
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/slider", get(home::slider))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/{user_id}", get(cart::show_for_user))
}

/// Create the health check routes router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::health))
        .route("/ready", get(health::readiness))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Catalog
        .nest("/products", product_routes())
        .route("/product/{id}", get(products::show))
        .route("/category/{slug}", get(category::show))
        .route("/images/{id}", get(images::show))
        // Cart routes
        .nest("/cart", cart_routes())
        // Health checks
        .nest("/health", health_routes())
}

/// Layout data for a full page: drains queued toasts from the session.
async fn page_layout(session: &Session, active_path: &str) -> LayoutView {
    LayoutView::new(active_path, take_toasts(session).await)
}
