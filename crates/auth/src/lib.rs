//! `dealdesk-auth` — stateless session and RBAC core.
//!
//! This crate is intentionally decoupled from HTTP and storage: it issues and
//! verifies session credentials and decides what a request may reach.

pub mod authorize;
pub mod claims;
pub mod codec;
pub mod cookie;
pub mod error;
pub mod gate;
pub mod principal;
pub mod roles;
pub mod secret;

pub use authorize::{AdminAction, AuthzError, authorize};
pub use claims::SessionPayload;
pub use codec::{
    Credential, MAX_SESSION_TTL_DAYS, SessionCodec, SessionSettings, default_session_ttl,
};
pub use cookie::{SESSION_COOKIE_NAME, SessionCookie};
pub use error::{InvalidSession, IssueError, SettingsError};
pub use gate::{AccessGate, GateDecision, PathClass, RouteTable, decide};
pub use principal::{EmptySubjectId, Identity, SessionId, SubjectId};
pub use roles::{Role, UnknownRole};
pub use secret::{MIN_SECRET_LEN, SecretError, SessionSecret};
