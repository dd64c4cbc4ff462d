//! Session codec: signed, expiring credentials (HMAC-SHA256, JWS compact form).
//!
//! A credential is `header.payload.tag`, each segment base64url without
//! padding. The alphabet excludes `.`, so segments cannot bleed into each
//! other. Tag comparison happens inside `jsonwebtoken` in constant time.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::claims::{RawClaims, SessionPayload};
use crate::cookie::{SESSION_COOKIE_NAME, SessionCookie};
use crate::error::{CredentialError, InvalidSession, IssueError, SettingsError};
use crate::{Role, SessionSecret, SubjectId};

/// Default lifetime of a credential.
pub fn default_session_ttl() -> Duration {
    Duration::days(7)
}

/// Longest credential lifetime a codec accepts.
pub const MAX_SESSION_TTL_DAYS: i64 = 365;

/// Codec settings that are not secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Fixed lifetime added at issuance. Never extended on verification.
    pub ttl: Duration,
    pub cookie_name: String,
    /// Emit the `Secure` cookie attribute (off only for local development).
    pub secure_cookies: bool,
}

impl SessionSettings {
    /// The ttl must be a whole number of seconds in `(0, MAX_SESSION_TTL_DAYS]`,
    /// so that `exp > iat` survives the second-precision wire encoding.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.ttl <= Duration::zero() {
            return Err(SettingsError::NonPositiveTtl {
                seconds: self.ttl.num_seconds(),
            });
        }
        if self.ttl > Duration::days(MAX_SESSION_TTL_DAYS) {
            return Err(SettingsError::TtlTooLong {
                max_days: MAX_SESSION_TTL_DAYS,
            });
        }
        if self.ttl.subsec_nanos() != 0 {
            return Err(SettingsError::FractionalTtl);
        }
        if self.cookie_name.is_empty() {
            return Err(SettingsError::EmptyCookieName);
        }
        Ok(())
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl: default_session_ttl(),
            cookie_name: SESSION_COOKIE_NAME.to_string(),
            secure_cookies: true,
        }
    }
}

/// Opaque signed credential.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl core::fmt::Debug for Credential {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Issues and verifies session credentials.
///
/// Immutable after construction; share it behind an `Arc`.
#[derive(Clone)]
pub struct SessionCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    settings: SessionSettings,
}

impl SessionCodec {
    /// # Errors
    ///
    /// Settings that could mint credentials which never verify are rejected.
    pub fn new(secret: &SessionSecret, settings: SessionSettings) -> Result<Self, SettingsError> {
        settings.validate()?;

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against our own clock reading in `validate_at`.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();
        validation.leeway = 0;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.expose()),
            decoding: DecodingKey::from_secret(secret.expose()),
            validation,
            settings,
        })
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn issue(&self, subject_id: SubjectId, role: Role) -> Result<Credential, IssueError> {
        self.issue_at(subject_id, role, Utc::now())
    }

    /// Issue a credential using an explicit clock reading.
    pub fn issue_at(
        &self,
        subject_id: SubjectId,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<Credential, IssueError> {
        let payload = SessionPayload::new(subject_id, role, now, self.settings.ttl)?;
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &payload, &self.encoding)?;

        tracing::debug!(
            session_id = %payload.session_id(),
            role = %payload.role(),
            expires_at = %payload.expires_at(),
            "session issued"
        );

        Ok(Credential(token))
    }

    pub fn verify(&self, credential: Option<&str>) -> Result<SessionPayload, InvalidSession> {
        self.verify_at(credential, Utc::now())
    }

    /// Verify a credential against an explicit clock reading.
    ///
    /// Every failure collapses to [`InvalidSession`].
    pub fn verify_at(
        &self,
        credential: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<SessionPayload, InvalidSession> {
        self.decode_at(credential, now).map_err(|err| {
            if err != CredentialError::Absent {
                tracing::debug!(reason = err.kind(), "session rejected");
            }
            InvalidSession
        })
    }

    pub(crate) fn decode_at(
        &self,
        credential: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<SessionPayload, CredentialError> {
        let token = credential
            .filter(|t| !t.is_empty())
            .ok_or(CredentialError::Absent)?;

        let claims = jsonwebtoken::decode::<RawClaims>(token, &self.decoding, &self.validation)
            .map_err(classify)?
            .claims;

        let session_id = claims.session_id();
        let payload = claims.into_payload().inspect_err(|err| {
            tracing::warn!(%session_id, reason = err.kind(), "signed session failed conversion");
        })?;
        payload.validate_at(now).inspect_err(|err| {
            tracing::debug!(%session_id, reason = err.kind(), "session outside validity window");
        })?;

        Ok(payload)
    }

    /// Set-cookie instruction carrying a freshly issued credential.
    pub fn session_cookie(&self, credential: &Credential) -> SessionCookie {
        SessionCookie {
            name: self.settings.cookie_name.clone(),
            value: credential.as_str().to_string(),
            path: "/",
            max_age: self.settings.ttl,
            secure: self.settings.secure_cookies,
        }
    }

    /// Instruction to overwrite the session cookie with an expired empty value.
    ///
    /// Copies of the credential taken before this remain valid until expiry.
    pub fn revoke(&self) -> SessionCookie {
        SessionCookie {
            name: self.settings.cookie_name.clone(),
            value: String::new(),
            path: "/",
            max_age: Duration::zero(),
            secure: self.settings.secure_cookies,
        }
    }
}

impl core::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionCodec")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> CredentialError {
    match err.kind() {
        ErrorKind::InvalidSignature => CredentialError::Tampered,
        _ => CredentialError::Malformed,
    }
}
