//! Login, signup, logout and session introspection.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;

use dealdesk_auth::Identity;

use crate::accounts::Account;
use crate::app::dto::{CredentialsRequest, IdentityResponse};
use crate::app::{errors, AppState};
use crate::context::CurrentIdentity;
use crate::cookies;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/signup", post(signup))
        .route("/logout", post(logout))
        .route("/session", get(session))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<CredentialsRequest>,
) -> Response {
    match state.accounts.authenticate(&body.email, &body.password).await {
        Ok(Some(account)) => start_session(&state, jar, account),
        Ok(None) => {
            tracing::info!("login rejected");
            errors::json_error(
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "invalid email or password",
            )
        }
        Err(e) => errors::authenticator_error_to_response(e),
    }
}

/// POST /api/auth/signup - self-service accounts are always USER.
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<CredentialsRequest>,
) -> Response {
    match state.accounts.register(&body.email, &body.password).await {
        Ok(account) => start_session(&state, jar, account),
        Err(e) => errors::authenticator_error_to_response(e),
    }
}

/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    let jar = cookies::apply(jar, state.codec.revoke());
    (StatusCode::NO_CONTENT, jar).into_response()
}

/// GET /api/auth/session
pub async fn session(CurrentIdentity(identity): CurrentIdentity) -> Json<IdentityResponse> {
    Json(IdentityResponse::from(&identity))
}

fn start_session(state: &AppState, jar: CookieJar, account: Account) -> Response {
    let credential = match state.codec.issue(account.subject_id.clone(), account.role) {
        Ok(credential) => credential,
        Err(e) => return errors::issue_error_to_response(e),
    };

    let jar = cookies::apply(jar, state.codec.session_cookie(&credential));
    let identity = Identity::authenticated(account.subject_id, account.role);

    (jar, Json(IdentityResponse::from(&identity))).into_response()
}
