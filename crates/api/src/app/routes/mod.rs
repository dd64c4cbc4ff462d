use axum::{routing::get, Router};

use crate::app::AppState;

pub mod admin;
pub mod auth;
pub mod system;

/// Router for every endpoint; access is decided by the gate layer, not here.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(system::health))
        .nest("/api/auth", auth::router())
        .nest("/admin", admin::router())
}
