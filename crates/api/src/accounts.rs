//! Account lookup seam used by the login and signup handlers.
//!
//! The real user store lives outside this service; it only has to answer
//! "which `(subject, role)` does this email/password belong to".

use std::collections::HashMap;

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use password_hash::{PasswordHash, SaltString};
use thiserror::Error;
use tokio::sync::RwLock;

use dealdesk_auth::{Role, SubjectId};

/// Minimum password length accepted at signup.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Well-formed PHC string with `Argon2::default()` parameters that matches no
/// password. Verified against when the email is unknown.
const UNKNOWN_ACCOUNT_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1\
    $c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// The pair the session core consumes at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub subject_id: SubjectId,
    pub role: Role,
}

#[derive(Debug, Error)]
pub enum AuthenticatorError {
    #[error("an account with this email already exists")]
    AccountExists,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("account backend failure: {0}")]
    Backend(String),
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// `Ok(None)` for unknown email and wrong password alike.
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Account>, AuthenticatorError>;

    /// Self-service signup. Always yields a `USER` account.
    async fn register(&self, email: &str, password: &str) -> Result<Account, AuthenticatorError>;
}

struct StoredAccount {
    account: Account,
    password_hash: String,
}

/// Process-local account store with Argon2 password hashes.
///
/// For local runs and tests; nothing survives a restart.
#[derive(Default)]
pub struct InMemoryAccounts {
    inner: RwLock<HashMap<String, StoredAccount>>,
}

impl InMemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an account with an explicit role.
    pub async fn insert(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Account, AuthenticatorError> {
        let email = normalize_email(email)?;
        validate_password(password)?;

        let account = Account {
            subject_id: new_subject_id()?,
            role,
        };
        let password_hash = hash_blocking(password.to_string()).await?;

        self.inner.write().await.insert(
            email,
            StoredAccount {
                account: account.clone(),
                password_hash,
            },
        );
        Ok(account)
    }
}

#[async_trait]
impl Authenticator for InMemoryAccounts {
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Account>, AuthenticatorError> {
        let stored = match normalize_email(email) {
            Ok(email) => self
                .inner
                .read()
                .await
                .get(&email)
                .map(|s| (s.account.clone(), s.password_hash.clone())),
            Err(_) => None,
        };

        // Unknown emails still pay for one Argon2 verification.
        let (account, hash) = match stored {
            Some((account, hash)) => (Some(account), hash),
            None => (None, UNKNOWN_ACCOUNT_HASH.to_string()),
        };

        let password = password.to_string();
        let ok = tokio::task::spawn_blocking(move || verify_password(&hash, &password))
            .await
            .map_err(|e| AuthenticatorError::Backend(e.to_string()))?;

        Ok(account.filter(|_| ok))
    }

    async fn register(&self, email: &str, password: &str) -> Result<Account, AuthenticatorError> {
        let email = normalize_email(email)?;
        validate_password(password)?;

        if self.inner.read().await.contains_key(&email) {
            return Err(AuthenticatorError::AccountExists);
        }

        let password_hash = hash_blocking(password.to_string()).await?;
        let account = Account {
            subject_id: new_subject_id()?,
            role: Role::User,
        };

        let mut map = self.inner.write().await;
        if map.contains_key(&email) {
            return Err(AuthenticatorError::AccountExists);
        }
        map.insert(
            email,
            StoredAccount {
                account: account.clone(),
                password_hash,
            },
        );
        Ok(account)
    }
}

fn normalize_email(email: &str) -> Result<String, AuthenticatorError> {
    let email = email.trim().to_ascii_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AuthenticatorError::Validation("email is invalid".into()));
    }
    Ok(email)
}

fn validate_password(password: &str) -> Result<(), AuthenticatorError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthenticatorError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn new_subject_id() -> Result<SubjectId, AuthenticatorError> {
    SubjectId::new(uuid::Uuid::now_v7().simple().to_string())
        .map_err(|e| AuthenticatorError::Backend(e.to_string()))
}

async fn hash_blocking(password: String) -> Result<String, AuthenticatorError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthenticatorError::Backend(e.to_string()))?
}

fn hash_password(password: &str) -> Result<String, AuthenticatorError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes)
        .map_err(|e| AuthenticatorError::Backend(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AuthenticatorError::Backend(e.to_string()))?;
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthenticatorError::Backend(e.to_string()))?
        .to_string();
    Ok(phc)
}

fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_then_authenticate() {
        let accounts = InMemoryAccounts::new();
        let created = accounts.register("Shopper@Example.com", "hunter2hunter2").await.unwrap();
        assert_eq!(created.role, Role::User);

        let found = accounts
            .authenticate("shopper@example.com", "hunter2hunter2")
            .await
            .unwrap();
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let accounts = InMemoryAccounts::new();
        accounts.insert("ed@example.com", "editor-pass", Role::Editor).await.unwrap();

        assert_eq!(accounts.authenticate("ed@example.com", "nope-nope").await.unwrap(), None);
        assert_eq!(accounts.authenticate("ghost@example.com", "editor-pass").await.unwrap(), None);
        assert_eq!(accounts.authenticate("", "editor-pass").await.unwrap(), None);
    }

    #[tokio::test]
    async fn duplicate_signup_is_rejected() {
        let accounts = InMemoryAccounts::new();
        accounts.register("a@example.com", "password-1").await.unwrap();
        let err = accounts.register("A@example.com", "password-2").await.unwrap_err();
        assert!(matches!(err, AuthenticatorError::AccountExists));
    }

    #[tokio::test]
    async fn signup_validates_input() {
        let accounts = InMemoryAccounts::new();
        assert!(matches!(
            accounts.register("not-an-email", "password-1").await,
            Err(AuthenticatorError::Validation(_))
        ));
        assert!(matches!(
            accounts.register("a@example.com", "short").await,
            Err(AuthenticatorError::Validation(_))
        ));
    }

    #[test]
    fn unknown_account_hash_costs_the_same_as_a_stored_hash() {
        let dummy = PasswordHash::new(UNKNOWN_ACCOUNT_HASH).unwrap();
        let stored_phc = hash_password("some-password").unwrap();
        let stored = PasswordHash::new(&stored_phc).unwrap();

        assert_eq!(dummy.algorithm, stored.algorithm);
        assert_eq!(dummy.version, stored.version);
        let dummy_params = argon2::Params::try_from(&dummy).unwrap();
        let stored_params = argon2::Params::try_from(&stored).unwrap();
        assert_eq!(dummy_params.m_cost(), stored_params.m_cost());
        assert_eq!(dummy_params.t_cost(), stored_params.t_cost());
        assert_eq!(dummy_params.p_cost(), stored_params.p_cost());
        assert_eq!(dummy.hash.map(|h| h.len()), stored.hash.map(|h| h.len()));

        for guess in ["", "some-password", "password", "hunter2hunter2"] {
            assert!(!verify_password(UNKNOWN_ACCOUNT_HASH, guess));
        }
    }

    #[test]
    fn stored_hashes_are_salted_phc_strings() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2"));
        assert!(verify_password(&a, "same-password"));
        assert!(!verify_password(&a, "other-password"));
        assert!(!verify_password("not a phc string", "same-password"));
    }
}
