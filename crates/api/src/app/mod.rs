//! HTTP application wiring (Axum router + gate layer).
//!
//! - `routes/`: HTTP handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::Router;
use tower::ServiceBuilder;

use dealdesk_auth::{AccessGate, SessionCodec, SettingsError};

use crate::accounts::Authenticator;
use crate::config::ApiConfig;
use crate::middleware::{self, GateState};

pub mod dto;
pub mod errors;
pub mod routes;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub codec: Arc<SessionCodec>,
    pub accounts: Arc<dyn Authenticator>,
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// The gate wraps every route, including ones the table does not classify.
///
/// # Errors
///
/// Session settings the codec refuses (see [`SessionSettings::validate`]).
///
/// [`SessionSettings::validate`]: dealdesk_auth::SessionSettings::validate
pub fn build_app(
    config: &ApiConfig,
    accounts: Arc<dyn Authenticator>,
) -> Result<Router, SettingsError> {
    let codec = Arc::new(SessionCodec::new(&config.secret, config.session.clone())?);

    let gate_state = GateState {
        codec: codec.clone(),
        gate: Arc::new(AccessGate::new(config.routes.clone())),
        login_path: Arc::from(config.login_path.as_str()),
        denied_path: Arc::from(config.denied_path.as_str()),
    };

    let state = AppState { codec, accounts };

    Ok(routes::router()
        .with_state(state)
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn_with_state(
            gate_state,
            middleware::access_gate,
        ))))
}
