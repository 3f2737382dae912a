//! HTTP route handlers for the admin console.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Dashboard (requires auth)
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check
//!
//! # Auth
//! GET  /login                   - Login page
//! POST /login                   - Login action
//! GET  /register                - Register page
//! POST /register                - Register action
//! POST /logout                  - Logout action
//!
//! # Orders (require auth)
//! GET  /orders                  - Order list with assignment controls
//! POST /orders                  - Create order
//! POST /orders/{key}/assign     - Assign order to a delivery person
//! POST /orders/{key}/delete     - Delete order
//!
//! # Personnel (require auth)
//! GET  /personnel               - Delivery roster (?q= name filter)
//! POST /personnel               - Add delivery person
//! POST /personnel/{key}/delete  - Remove delivery person
//! ```

pub mod auth;
pub mod dashboard;
pub mod orders;
pub mod personnel;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/{key}/assign", post(orders::assign))
        .route("/{key}/delete", post(orders::delete))
}

/// Create the personnel routes router.
pub fn personnel_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(personnel::index).post(personnel::create))
        .route("/{key}/delete", post(personnel::delete))
}

/// Create all routes for the console.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .nest("/orders", order_routes())
        .nest("/personnel", personnel_routes())
        .merge(auth_routes())
}
