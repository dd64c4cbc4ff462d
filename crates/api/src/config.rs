//! Process configuration, read once at startup.
//!
//! Required field (`secret`) is a constructor parameter; everything else has a
//! default and a `with_*` override.

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

use dealdesk_auth::{
    MAX_SESSION_TTL_DAYS, RouteTable, SecretError, SessionSecret, SessionSettings, SettingsError,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SESSION_SECRET is required")]
    MissingSecret,

    #[error("SESSION_SECRET: {0}")]
    InvalidSecret(#[from] SecretError),

    #[error("SESSION_TTL_DAYS must be an integer from 1 to {MAX_SESSION_TTL_DAYS}, got '{0}'")]
    InvalidTtl(String),

    #[error("session settings: {0}")]
    InvalidSession(#[from] SettingsError),

    #[error("BIND_ADDR: {0}")]
    InvalidBindAddr(String),

    #[error("BOOTSTRAP_ADMIN_EMAIL and BOOTSTRAP_ADMIN_PASSWORD must be set together")]
    IncompleteBootstrap,
}

/// Deployment environment, as far as cookies are concerned.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AppEnv {
    Local,
    Production,
}

impl AppEnv {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("local" | "development" | "dev" | "test") => AppEnv::Local,
            _ => AppEnv::Production,
        }
    }
}

/// Credentials for an ADMIN account seeded into the in-memory account store.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub(crate) secret: SessionSecret,
    pub(crate) session: SessionSettings,
    pub(crate) routes: RouteTable,
    pub(crate) login_path: String,
    pub(crate) denied_path: String,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) bootstrap_admin: Option<BootstrapAdmin>,
}

impl ApiConfig {
    #[must_use]
    pub fn new(secret: SessionSecret) -> Self {
        Self {
            secret,
            session: SessionSettings::default(),
            routes: RouteTable::default(),
            login_path: "/login".into(),
            denied_path: "/".into(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            bootstrap_admin: None,
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `SESSION_SECRET`: HMAC key, at least 32 bytes
    ///
    /// # Optional env vars
    /// - `SESSION_TTL_DAYS`: credential lifetime in days (default 7)
    /// - `APP_ENV`: `local`/`development`/`test` drop the `Secure` cookie attribute
    /// - `BIND_ADDR`: listen address (default `0.0.0.0:8080`)
    /// - `BOOTSTRAP_ADMIN_EMAIL` + `BOOTSTRAP_ADMIN_PASSWORD`: seed one ADMIN account
    ///
    /// # Errors
    ///
    /// Any missing or invalid value is fatal; the server must not start.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("SESSION_SECRET").ok_or(ConfigError::MissingSecret)?;
        let secret = SessionSecret::new(secret.into_bytes())?;

        let mut config = Self::new(secret);

        if let Some(raw) = lookup("SESSION_TTL_DAYS") {
            let days = raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|d| (1..=MAX_SESSION_TTL_DAYS).contains(d))
                .ok_or_else(|| ConfigError::InvalidTtl(raw.clone()))?;
            config = config.with_session_ttl(Duration::days(days));
        }

        let env = AppEnv::parse(lookup("APP_ENV").as_deref());
        config = config.with_secure_cookies(env == AppEnv::Production);

        if let Some(raw) = lookup("BIND_ADDR") {
            let addr = raw
                .trim()
                .parse::<SocketAddr>()
                .map_err(|e| ConfigError::InvalidBindAddr(e.to_string()))?;
            config = config.with_bind_addr(addr);
        }

        match (lookup("BOOTSTRAP_ADMIN_EMAIL"), lookup("BOOTSTRAP_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => {
                config = config.with_bootstrap_admin(email, password);
            }
            (None, None) => {}
            _ => return Err(ConfigError::IncompleteBootstrap),
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the values the builder methods accept without validation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.session.validate()?;
        Ok(())
    }

    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session.ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.session.cookie_name = name.into();
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.session.secure_cookies = secure;
        self
    }

    #[must_use]
    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    #[must_use]
    pub fn with_denied_path(mut self, path: impl Into<String>) -> Self {
        self.denied_path = path.into();
        self
    }

    #[must_use]
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    #[must_use]
    pub fn with_bootstrap_admin(
        mut self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.bootstrap_admin = Some(BootstrapAdmin {
            email: email.into(),
            password: password.into(),
        });
        self
    }

    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    pub fn session(&self) -> &SessionSettings {
        &self.session
    }

    pub fn bootstrap_admin(&self) -> Option<&BootstrapAdmin> {
        self.bootstrap_admin.as_ref()
    }
}
