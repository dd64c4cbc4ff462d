use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CredentialError, IssueError};
use crate::{Role, SessionId, SubjectId};

/// The authenticated identity carried inside a credential.
///
/// Immutable once built: fields are read through accessors only, and a new
/// login always produces a new payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionPayload {
    #[serde(rename = "sub")]
    subject_id: SubjectId,

    role: Role,

    #[serde(rename = "sid")]
    session_id: SessionId,

    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    issued_at: DateTime<Utc>,

    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    expires_at: DateTime<Utc>,
}

impl SessionPayload {
    /// Timestamps are truncated to whole seconds so that the payload survives
    /// the wire encoding unchanged.
    pub(crate) fn new(
        subject_id: SubjectId,
        role: Role,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, IssueError> {
        let issued_at = now.trunc_subsecs(0);
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or(IssueError::ExpiryOutOfRange)?;
        Ok(Self {
            subject_id,
            role,
            session_id: SessionId::new(),
            issued_at,
            expires_at,
        })
    }

    pub fn subject_id(&self) -> &SubjectId {
        &self.subject_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Deterministically validate the time window against a server clock reading.
    pub(crate) fn validate_at(&self, now: DateTime<Utc>) -> Result<(), CredentialError> {
        if self.expires_at <= self.issued_at {
            return Err(CredentialError::Malformed);
        }
        if now >= self.expires_at {
            return Err(CredentialError::Expired);
        }
        Ok(())
    }
}

/// Claims as they arrive off the wire, before the role is checked.
#[derive(Debug, Deserialize)]
pub(crate) struct RawClaims {
    sub: String,
    role: String,
    sid: SessionId,
    #[serde(with = "chrono::serde::ts_seconds")]
    iat: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    exp: DateTime<Utc>,
}

impl RawClaims {
    pub(crate) fn session_id(&self) -> SessionId {
        self.sid
    }

    /// The single place where a foreign role string can surface.
    pub(crate) fn into_payload(self) -> Result<SessionPayload, CredentialError> {
        let role: Role = self
            .role
            .parse()
            .map_err(|_| CredentialError::RoleUnrecognized)?;
        let subject_id = SubjectId::new(self.sub).map_err(|_| CredentialError::Malformed)?;

        Ok(SessionPayload {
            subject_id,
            role,
            session_id: self.sid,
            issued_at: self.iat,
            expires_at: self.exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject() -> SubjectId {
        SubjectId::new("user-1").unwrap()
    }

    #[test]
    fn window_is_fixed_at_creation() {
        let now = Utc::now();
        let p = SessionPayload::new(subject(), Role::Editor, now, Duration::days(7)).unwrap();
        assert_eq!(p.expires_at() - p.issued_at(), Duration::days(7));
        assert!(p.issued_at() <= now);
        assert_eq!(p.issued_at().timestamp_subsec_nanos(), 0);
    }

    #[test]
    fn unrepresentable_expiry_is_an_issue_error() {
        let end_of_time = DateTime::<Utc>::MAX_UTC;
        let result = SessionPayload::new(subject(), Role::Admin, end_of_time, Duration::days(7));
        assert!(matches!(result, Err(IssueError::ExpiryOutOfRange)));
    }

    #[test]
    fn validate_rejects_at_and_after_expiry() {
        let now = Utc::now();
        let p = SessionPayload::new(subject(), Role::User, now, Duration::hours(1)).unwrap();

        assert_eq!(p.validate_at(p.issued_at()), Ok(()));
        assert_eq!(p.validate_at(p.expires_at()), Err(CredentialError::Expired));
        assert_eq!(
            p.validate_at(p.expires_at() + Duration::seconds(1)),
            Err(CredentialError::Expired)
        );
    }

    #[test]
    fn inverted_window_is_malformed() {
        let now = Utc::now().trunc_subsecs(0);
        let raw = RawClaims {
            sub: "user-1".into(),
            role: "ADMIN".into(),
            sid: SessionId::new(),
            iat: now,
            exp: now,
        };
        let p = raw.into_payload().unwrap();
        assert_eq!(p.validate_at(now), Err(CredentialError::Malformed));
    }

    #[test]
    fn unknown_role_is_rejected_at_conversion() {
        let now = Utc::now();
        let raw = RawClaims {
            sub: "user-1".into(),
            role: "ROOT".into(),
            sid: SessionId::new(),
            iat: now,
            exp: now + Duration::days(1),
        };
        assert_eq!(raw.into_payload(), Err(CredentialError::RoleUnrecognized));
    }
}
