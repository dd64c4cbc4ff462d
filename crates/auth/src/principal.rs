use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::Role;

/// Identity of an authenticated principal, as issued by the user store.
///
/// Opaque to this crate; the only rule is that it is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubjectId(String);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("subject id must not be empty")]
pub struct EmptySubjectId;

impl SubjectId {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptySubjectId> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(EmptySubjectId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SubjectId {
    type Error = EmptySubjectId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SubjectId> for String {
    fn from(value: SubjectId) -> Self {
        value.0
    }
}

impl FromStr for SubjectId {
    type Err = EmptySubjectId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl core::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-issuance identifier, used to correlate log lines for one session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SessionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// What downstream handlers learn about the caller.
///
/// Built by the access gate from the verified session (or its absence).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub is_authenticated: bool,
    pub role: Option<Role>,
    pub subject_id: Option<SubjectId>,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            is_authenticated: false,
            role: None,
            subject_id: None,
        }
    }

    pub fn authenticated(subject_id: SubjectId, role: Role) -> Self {
        Self {
            is_authenticated: true,
            role: Some(role),
            subject_id: Some(subject_id),
        }
    }
}
