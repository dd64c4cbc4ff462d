use serde::{Deserialize, Serialize};

use dealdesk_auth::{AdminAction, Identity};

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct IdentityResponse {
    pub is_authenticated: bool,
    pub role: Option<String>,
    pub subject_id: Option<String>,
}

impl From<&Identity> for IdentityResponse {
    fn from(identity: &Identity) -> Self {
        Self {
            is_authenticated: identity.is_authenticated,
            role: identity.role.map(|r| r.as_str().to_string()),
            subject_id: identity.subject_id.as_ref().map(|s| s.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CapabilityResponse {
    pub action: AdminAction,
    pub allowed: bool,
}
