//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health              - Liveness check
//! GET  /health/ready        - Readiness check (pings the database)
//!
//! # Dialog
//! POST /bot/event           - Feed one user event into the checkout flow
//!
//! # Orders
//! GET  /orders/{id}         - Full order aggregate with items and history
//! POST /orders/{id}/status  - Move an order along the status graph
//! ```

mod events;
mod orders;

use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bot/event", post(events::handle_event))
        .route("/orders/{id}", get(orders::get_order))
        .route("/orders/{id}/status", post(orders::update_status))
}
