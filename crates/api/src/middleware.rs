use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use dealdesk_auth::{AccessGate, GateDecision, SessionCodec};

#[derive(Clone)]
pub struct GateState {
    pub codec: Arc<SessionCodec>,
    pub gate: Arc<AccessGate>,
    pub login_path: Arc<str>,
    pub denied_path: Arc<str>,
}

/// Runs before every handler: verify the session cookie, apply the route
/// policy, and hand the resulting identity to downstream handlers.
///
/// Only the session cookie is read. Every kind of invalid session produces the
/// same redirect.
pub async fn access_gate(State(state): State<GateState>, mut req: Request, next: Next) -> Response {
    let session = {
        let jar = CookieJar::from_headers(req.headers());
        let credential = jar
            .get(&state.codec.settings().cookie_name)
            .map(|c| c.value());
        state.codec.verify(credential)
    };

    match state.gate.evaluate(req.uri().path(), &session) {
        GateDecision::Allow(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        GateDecision::RedirectToLogin => {
            tracing::info!(path = %req.uri().path(), "protected path without session");
            Redirect::to(&state.login_path).into_response()
        }
        GateDecision::Deny => {
            tracing::info!(
                path = %req.uri().path(),
                session_id = ?session.as_ref().ok().map(|p| p.session_id()),
                "role may not enter back office"
            );
            Redirect::to(&state.denied_path).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::{header, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    use dealdesk_auth::{Role, RouteTable, SessionSecret, SessionSettings, SubjectId};

    use crate::context::CurrentIdentity;

    fn codec() -> SessionCodec {
        SessionCodec::new(
            &SessionSecret::new("middleware-test-secret-long-enough!!").unwrap(),
            SessionSettings::default(),
        )
        .unwrap()
    }

    fn app(codec: SessionCodec) -> Router {
        let state = GateState {
            codec: Arc::new(codec),
            gate: Arc::new(AccessGate::new(RouteTable::new(["/admin"], ["/"]))),
            login_path: Arc::from("/login"),
            denied_path: Arc::from("/"),
        };

        async fn role(CurrentIdentity(identity): CurrentIdentity) -> &'static str {
            identity.role.map(|r| r.as_str()).unwrap_or("anonymous")
        }

        Router::new()
            .route("/admin/area", get(role))
            .route("/open", get(role))
            .layer(axum::middleware::from_fn_with_state(state, access_gate))
    }

    fn credential(codec: &SessionCodec, role: Role) -> String {
        codec
            .issue(SubjectId::new("subject-1").unwrap(), role)
            .unwrap()
            .into_string()
    }

    fn get_request(path: &str, cookie: Option<String>) -> Request {
        let mut builder = axum::http::Request::builder().uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_text(res: Response) -> String {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn elevated_session_reaches_protected_handler_with_identity() {
        let codec = codec();
        let token = credential(&codec, Role::Editor);

        let res = app(codec)
            .oneshot(get_request("/admin/area", Some(format!("session={token}"))))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(res).await, "EDITOR");
    }

    #[tokio::test]
    async fn user_session_is_sent_to_denied_destination() {
        let codec = codec();
        let token = credential(&codec, Role::User);

        let res = app(codec)
            .oneshot(get_request("/admin/area", Some(format!("session={token}"))))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn only_the_session_cookie_is_consulted() {
        let codec = codec();
        let token = credential(&codec, Role::Admin);

        let req = axum::http::Request::builder()
            .uri("/admin/area")
            .header(header::COOKIE, format!("token={token}; other=1"))
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let res = app(codec).oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[header::LOCATION], "/login");
    }

    #[tokio::test]
    async fn unclassified_paths_get_identity_either_way() {
        let codec = codec();
        let token = credential(&codec, Role::Admin);
        let app = app(codec);

        let res = app
            .clone()
            .oneshot(get_request("/open", Some(format!("session={token}"))))
            .await
            .unwrap();
        assert_eq!(body_text(res).await, "ADMIN");

        let res = app.oneshot(get_request("/open", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(res).await, "anonymous");
    }

    #[tokio::test]
    async fn custom_cookie_name_is_honored() {
        let codec = SessionCodec::new(
            &SessionSecret::new("middleware-test-secret-long-enough!!").unwrap(),
            SessionSettings {
                cookie_name: "dd_session".into(),
                ..SessionSettings::default()
            },
        )
        .unwrap();
        let token = credential(&codec, Role::Admin);
        let app = app(codec);

        let res = app
            .clone()
            .oneshot(get_request("/admin/area", Some(format!("dd_session={token}"))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = app
            .oneshot(get_request("/admin/area", Some(format!("session={token}"))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
    }
}
