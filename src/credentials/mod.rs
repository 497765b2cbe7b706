//! Partner credentials and the store they are resolved from.
//!
//! A credential pairs an API key id (sent by the partner in `x-api-key`)
//! with the shared HMAC secret used to sign requests and responses. Secrets
//! are configured as base64 text and decoded once, when the credential is
//! created, so the signing code never handles an undecodable key.

mod in_memory;

pub use in_memory::InMemoryCredentialStore;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretBox};
use std::fmt;
use std::sync::Arc;

/// Errors raised while building credentials from configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("shared secret for api key `{0}` is not valid base64")]
    InvalidBase64(String),

    #[error("shared secret for api key `{0}` is empty")]
    EmptySecret(String),

    #[error("api key id must not be empty")]
    EmptyApiKeyId,
}

/// Decoded HMAC key for one partner.
///
/// The key bytes live in a [`SecretBox`] and are redacted from `Debug`
/// output. Cloning is cheap and shares the same allocation.
#[derive(Clone)]
pub struct SharedSecret(Arc<SecretBox<[u8]>>);

impl SharedSecret {
    /// Decode a base64 (standard alphabet, padded) secret.
    pub fn from_base64(encoded: &str) -> Result<Self, base64::DecodeError> {
        let decoded = STANDARD.decode(encoded)?;
        Ok(Self::from_bytes(decoded))
    }

    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        Self(Arc::new(SecretBox::new(bytes.into_boxed_slice())))
    }

    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }

    pub(crate) fn expose(&self) -> &[u8] {
        self.0.expose_secret()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret([REDACTED])")
    }
}

/// An API key id together with its shared secret
#[derive(Debug, Clone)]
pub struct Credential {
    api_key_id: String,
    secret: SharedSecret,
}

impl Credential {
    /// Build a credential from an API key id and a base64-encoded secret.
    ///
    /// # Errors
    ///
    /// Fails if the key id is empty, the secret is not valid base64, or the
    /// secret decodes to zero bytes.
    pub fn new(
        api_key_id: impl Into<String>,
        base64_secret: &str,
    ) -> Result<Self, CredentialError> {
        let api_key_id = api_key_id.into();
        if api_key_id.is_empty() {
            return Err(CredentialError::EmptyApiKeyId);
        }

        let secret = SharedSecret::from_base64(base64_secret)
            .map_err(|_| CredentialError::InvalidBase64(api_key_id.clone()))?;
        if secret.is_empty() {
            return Err(CredentialError::EmptySecret(api_key_id));
        }

        Ok(Self { api_key_id, secret })
    }

    pub fn api_key_id(&self) -> &str {
        &self.api_key_id
    }

    pub fn secret(&self) -> &SharedSecret {
        &self.secret
    }
}

/// Read-only lookup of shared secrets by API key id.
///
/// Implementations must be safe to call from many request tasks at once.
/// Lookups are synchronous: a store backed by a remote secret manager is
/// expected to load or cache its secrets ahead of time, and any locking it
/// needs is its own business.
pub trait CredentialStore: Send + Sync {
    /// Resolve the secret for `api_key_id`, or `None` if the key is unknown.
    fn lookup(&self, api_key_id: &str) -> Option<SharedSecret>;

    /// Number of known credentials, if the store can tell cheaply.
    fn credential_count(&self) -> Option<usize> {
        None
    }
}

impl<T: CredentialStore + ?Sized> CredentialStore for Arc<T> {
    fn lookup(&self, api_key_id: &str) -> Option<SharedSecret> {
        (**self).lookup(api_key_id)
    }

    fn credential_count(&self) -> Option<usize> {
        (**self).credential_count()
    }
}
