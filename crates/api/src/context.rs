use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use dealdesk_auth::Identity;

/// Identity of the caller for a request (set by the access gate).
///
/// Never rejects: a request that did not pass through the gate is treated as
/// anonymous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentIdentity(pub Identity);

impl CurrentIdentity {
    pub fn identity(&self) -> &Identity {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .extensions
            .get::<Identity>()
            .cloned()
            .unwrap_or_else(Identity::anonymous);
        Ok(Self(identity))
    }
}
