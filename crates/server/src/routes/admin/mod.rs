//! Admin-only routes. Every handler requires [`crate::middleware::RequireAdmin`].

pub mod attendees;
pub mod logs;

use axum::{
    Router,
    routing::{get, patch},
};

use crate::state::AppState;

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/attendees",
            get(attendees::list).post(attendees::create),
        )
        .route(
            "/attendees/{id}",
            patch(attendees::update).delete(attendees::delete),
        )
        .route("/logs", get(logs::list))
}
