//! Back-office entry points.
//!
//! The gate has already required ADMIN or EDITOR for everything under
//! `/admin`; handlers here layer per-action checks on top.

use axum::{
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use dealdesk_auth::{authorize, AdminAction};

use crate::app::dto::{CapabilityResponse, IdentityResponse};
use crate::app::{errors, AppState};
use crate::context::CurrentIdentity;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard))
        .route("/capabilities", get(capabilities))
}

/// GET /admin
pub async fn dashboard(CurrentIdentity(identity): CurrentIdentity) -> Response {
    if let Err(e) = authorize(&identity, AdminAction::View) {
        return errors::authz_error_to_response(e);
    }
    Json(IdentityResponse::from(&identity)).into_response()
}

/// GET /admin/capabilities - which back-office actions the caller may perform.
pub async fn capabilities(
    CurrentIdentity(identity): CurrentIdentity,
) -> Json<Vec<CapabilityResponse>> {
    Json(
        AdminAction::ALL
            .into_iter()
            .map(|action| CapabilityResponse {
                action,
                allowed: authorize(&identity, action).is_ok(),
            })
            .collect(),
    )
}
