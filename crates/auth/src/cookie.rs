use chrono::Duration;

/// Name of the cookie that carries the session credential.
pub const SESSION_COOKIE_NAME: &str = "session";

/// Transport-agnostic set-cookie instruction for the session cookie.
///
/// The HTTP layer always adds `HttpOnly` and `SameSite=Lax`.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub path: &'static str,
    pub max_age: Duration,
    pub secure: bool,
}

impl SessionCookie {
    /// True for the clearing instruction produced on logout.
    pub fn is_removal(&self) -> bool {
        self.value.is_empty() && self.max_age <= Duration::zero()
    }
}

impl core::fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionCookie")
            .field("name", &self.name)
            .field("value", &if self.value.is_empty() { "" } else { "<redacted>" })
            .field("path", &self.path)
            .field("max_age", &self.max_age)
            .field("secure", &self.secure)
            .finish()
    }
}
