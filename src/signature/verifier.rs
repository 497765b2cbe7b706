use super::canonical::{CanonicalMessage, constant_time_eq};
use super::header::{SignatureAlgorithm, SignatureHeader};
use super::{X_API_KEY, X_ENDPOINT, X_SIGNATURE, X_TIMESTAMP};
use crate::credentials::CredentialStore;
use axum::http::HeaderMap;
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::Arc;

/// Reasons an inbound request fails signature verification.
///
/// Every variant is a client fault. The kind is meant for server-side logs;
/// callers must answer all of them with the same generic rejection so the
/// response never tells an attacker which check failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    #[error("missing required header `{0}`")]
    MissingHeader(&'static str),

    #[error("unsupported signature algorithm `{0}`")]
    UnsupportedAlgorithm(String),

    #[error("unknown api key")]
    UnknownApiKey,

    #[error("signature is not valid base64")]
    MalformedSignature,

    #[error("signature does not match")]
    SignatureMismatch,
}

impl VerificationError {
    /// Short, stable name for logs and metrics labels
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingHeader(_) => "missing_header",
            Self::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            Self::UnknownApiKey => "unknown_api_key",
            Self::MalformedSignature => "malformed_signature",
            Self::SignatureMismatch => "signature_mismatch",
        }
    }
}

/// Case-insensitive access to request headers
pub trait HeaderLookup {
    /// Value of the header `name` (lowercase), if present and valid text
    fn header(&self, name: &str) -> Option<&str>;
}

/// Values that are not valid UTF-8 are treated as absent.
impl HeaderLookup for HeaderMap {
    fn header(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(|value| std::str::from_utf8(value.as_bytes()).ok())
    }
}

impl<K, V, S> HeaderLookup for HashMap<K, V, S>
where
    K: AsRef<str>,
    V: AsRef<str>,
    S: BuildHasher,
{
    fn header(&self, name: &str) -> Option<&str> {
        find_ignore_case(self.iter(), name)
    }
}

impl<K: AsRef<str>, V: AsRef<str>> HeaderLookup for [(K, V)] {
    fn header(&self, name: &str) -> Option<&str> {
        find_ignore_case(self.iter().map(|(key, value)| (key, value)), name)
    }
}

fn find_ignore_case<'a, K, V>(
    mut entries: impl Iterator<Item = (&'a K, &'a V)>,
    name: &str,
) -> Option<&'a str>
where
    K: AsRef<str> + 'a,
    V: AsRef<str> + 'a,
{
    entries
        .find(|(key, _)| AsRef::<str>::as_ref(*key).eq_ignore_ascii_case(name))
        .map(|(_, value)| AsRef::<str>::as_ref(value))
}

/// Everything a single request contributes to its own verification.
///
/// Borrowed from the request for the duration of one `verify` call and
/// never stored.
#[derive(Debug, Clone, Copy)]
pub struct SignedRequestContext<'a> {
    pub endpoint: &'a str,
    pub timestamp: &'a str,
    pub algorithm: SignatureAlgorithm,
    /// Base64 signature text with the algorithm prefix removed
    pub signature: &'a str,
    pub api_key_id: &'a str,
    pub raw_body: &'a [u8],
}

impl<'a> SignedRequestContext<'a> {
    /// Pull the four signature headers and parse the algorithm prefix.
    ///
    /// Headers are checked in the order endpoint, timestamp, signature,
    /// api key; the first one missing is reported.
    pub fn from_headers<H>(headers: &'a H, raw_body: &'a [u8]) -> Result<Self, VerificationError>
    where
        H: HeaderLookup + ?Sized,
    {
        let require = |name: &'static str| {
            headers
                .header(name)
                .ok_or(VerificationError::MissingHeader(name))
        };

        let endpoint = require(X_ENDPOINT)?;
        let timestamp = require(X_TIMESTAMP)?;
        let signature = require(X_SIGNATURE)?;
        let api_key_id = require(X_API_KEY)?;

        let header = SignatureHeader::parse(signature)?;

        Ok(Self {
            endpoint,
            timestamp,
            algorithm: header.algorithm(),
            signature: header.encoded(),
            api_key_id,
            raw_body,
        })
    }

    pub fn canonical_message(&self) -> CanonicalMessage {
        CanonicalMessage::new(self.timestamp, self.endpoint, Some(self.raw_body))
    }

    /// Decoded signature bytes
    pub fn signature_bytes(&self) -> Result<Vec<u8>, VerificationError> {
        SignatureHeader::from_parts(self.algorithm, self.signature).decode()
    }

    fn into_verified(self) -> VerifiedContext {
        VerifiedContext {
            endpoint: self.endpoint.to_string(),
            timestamp: self.timestamp.to_string(),
            api_key_id: self.api_key_id.to_string(),
        }
    }
}

/// Outcome of a successful verification.
///
/// Carries the values the response must echo and sign with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedContext {
    pub endpoint: String,
    pub timestamp: String,
    pub api_key_id: String,
}

/// Verifies inbound webhook signatures against partner credentials.
///
/// Verification is synchronous and CPU-bound; call it directly from a
/// request handler once the body has been buffered.
///
/// # Example
///
/// ```rust,ignore
/// use cardhook::{Credential, InMemoryCredentialStore, SignatureVerifier};
/// use std::sync::Arc;
///
/// let store = InMemoryCredentialStore::new()
///     .with_credential(Credential::new("partner-key", "aGVsbG8=")?);
/// let verifier = SignatureVerifier::new(Arc::new(store));
///
/// let context = verifier.verify(&headers, &body)?;
/// ```
#[derive(Clone)]
pub struct SignatureVerifier {
    credentials: Arc<dyn CredentialStore>,
}

impl SignatureVerifier {
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        Self { credentials }
    }

    /// Verify the signature headers of a request against its raw body.
    ///
    /// `raw_body` must be the bytes exactly as received, before any JSON
    /// parsing. Failures are logged at `warn` with their kind.
    pub fn verify<H>(&self, headers: &H, raw_body: &[u8]) -> Result<VerifiedContext, VerificationError>
    where
        H: HeaderLookup + ?Sized,
    {
        let result = self.check(headers, raw_body);

        if let Err(ref error) = result {
            tracing::warn!(
                reason = error.kind(),
                api_key_id = headers.header(X_API_KEY).unwrap_or("<none>"),
                endpoint = headers.header(X_ENDPOINT).unwrap_or("<none>"),
                error = %error,
                "Webhook signature verification failed"
            );
        }

        result
    }

    fn check<H>(&self, headers: &H, raw_body: &[u8]) -> Result<VerifiedContext, VerificationError>
    where
        H: HeaderLookup + ?Sized,
    {
        let request = SignedRequestContext::from_headers(headers, raw_body)?;

        // Unknown keys stop here, before any HMAC work
        let secret = self
            .credentials
            .lookup(request.api_key_id)
            .ok_or(VerificationError::UnknownApiKey)?;

        let expected = request.canonical_message().tag(&secret);
        let received = request.signature_bytes()?;

        if !constant_time_eq(&received, &expected) {
            return Err(VerificationError::SignatureMismatch);
        }

        tracing::debug!(
            api_key_id = request.api_key_id,
            endpoint = request.endpoint,
            "Webhook signature verified"
        );

        Ok(request.into_verified())
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier").finish_non_exhaustive()
    }
}
