use thiserror::Error;

/// Why a credential failed to verify.
///
/// Internal to the codec. Callers only ever see [`InvalidSession`]; the kind is
/// kept for diagnostics.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CredentialError {
    #[error("no session credential present")]
    Absent,

    #[error("credential could not be decoded")]
    Malformed,

    #[error("credential signature mismatch")]
    Tampered,

    #[error("credential has expired")]
    Expired,

    #[error("credential carries an unrecognized role")]
    RoleUnrecognized,
}

impl CredentialError {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            CredentialError::Absent => "absent",
            CredentialError::Malformed => "malformed",
            CredentialError::Tampered => "tampered",
            CredentialError::Expired => "expired",
            CredentialError::RoleUnrecognized => "role_unrecognized",
        }
    }
}

/// The single failure outcome of session verification.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("invalid session")]
pub struct InvalidSession;

/// Failure to build a credential.
#[derive(Debug, Error)]
pub enum IssueError {
    #[error("failed to sign session payload: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("session expiry is not representable")]
    ExpiryOutOfRange,
}

/// Rejected [`SessionSettings`](crate::SessionSettings).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("session ttl must be positive, got {seconds}s")]
    NonPositiveTtl { seconds: i64 },

    #[error("session ttl must be a whole number of seconds")]
    FractionalTtl,

    #[error("session ttl must not exceed {max_days} days")]
    TtlTooLong { max_days: i64 },

    #[error("session cookie name must not be empty")]
    EmptyCookieName,
}
