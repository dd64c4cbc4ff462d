use thiserror::Error;

/// Minimum accepted key length for HMAC-SHA256.
pub const MIN_SECRET_LEN: usize = 32;

/// Server-held signing key.
///
/// Loaded once at process start and handed to the codec. `Debug` never prints
/// the bytes.
#[derive(Clone)]
pub struct SessionSecret(Vec<u8>);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SecretError {
    #[error("session secret is empty")]
    Empty,

    #[error("session secret is too short ({len} bytes, need at least {MIN_SECRET_LEN})")]
    TooShort { len: usize },
}

impl SessionSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, SecretError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(SecretError::Empty);
        }
        if bytes.len() < MIN_SECRET_LEN {
            return Err(SecretError::TooShort { len: bytes.len() });
        }
        Ok(Self(bytes))
    }

    pub(crate) fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl core::fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("SessionSecret").field(&"<redacted>").finish()
    }
}
