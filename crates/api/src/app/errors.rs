use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use dealdesk_auth::{AuthzError, IssueError};

use crate::accounts::AuthenticatorError;

pub fn authenticator_error_to_response(err: AuthenticatorError) -> axum::response::Response {
    match err {
        AuthenticatorError::AccountExists => {
            json_error(StatusCode::CONFLICT, "account_exists", "account already exists")
        }
        AuthenticatorError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        AuthenticatorError::Backend(msg) => {
            tracing::error!(error = %msg, "account backend failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
        }
    }
}

pub fn issue_error_to_response(err: IssueError) -> axum::response::Response {
    tracing::error!(error = %err, "failed to issue session");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
}

pub fn authz_error_to_response(err: AuthzError) -> axum::response::Response {
    match err {
        AuthzError::Unauthenticated => {
            json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "sign in required")
        }
        AuthzError::Forbidden(action) => json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            format!("role may not {action}"),
        ),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
