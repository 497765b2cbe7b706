use super::canonical::CanonicalMessage;
use super::header::{SignatureAlgorithm, format_signature};
use super::verifier::VerifiedContext;
use super::{X_ENDPOINT, X_SIGNATURE, X_TIMESTAMP};
use crate::credentials::CredentialStore;
use axum::http::{HeaderMap, HeaderValue, header};
use std::sync::Arc;

/// Failures while signing an outbound response.
///
/// These are integration faults on our side, never caused by the client:
/// a request only reaches the signer after its own signature verified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SigningError {
    #[error("no credential for api key `{0}` while signing a response")]
    MissingCredential(String),

    #[error("value for response header `{0}` is not a valid header value")]
    InvalidHeaderValue(&'static str),
}

/// Signs outbound responses with the partner's shared secret.
///
/// The message is built the same way as for requests:
/// `timestamp || endpoint || body`, with no body bytes when the response
/// has no body.
#[derive(Clone)]
pub struct ResponseSigner {
    credentials: Arc<dyn CredentialStore>,
}

impl ResponseSigner {
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        Self { credentials }
    }

    /// Compute the `X-Signature` value for a response.
    ///
    /// `body` must be the exact bytes that will be written.
    pub fn sign(
        &self,
        api_key_id: &str,
        timestamp: &str,
        endpoint: &str,
        body: Option<&[u8]>,
    ) -> Result<String, SigningError> {
        let Some(secret) = self.credentials.lookup(api_key_id) else {
            tracing::error!(
                api_key_id = %api_key_id,
                endpoint = %endpoint,
                "Credential disappeared between verification and response signing"
            );
            return Err(SigningError::MissingCredential(api_key_id.to_string()));
        };

        let tag = CanonicalMessage::new(timestamp, endpoint, body).tag(&secret);
        Ok(format_signature(SignatureAlgorithm::HmacSha256, &tag))
    }

    /// Sign a response to a verified request, echoing its timestamp and endpoint
    pub fn sign_response(
        &self,
        context: &VerifiedContext,
        body: Option<&[u8]>,
    ) -> Result<ResponseSignature, SigningError> {
        let signature = self.sign(
            &context.api_key_id,
            &context.timestamp,
            &context.endpoint,
            body,
        )?;

        Ok(ResponseSignature {
            signature,
            timestamp: context.timestamp.clone(),
            endpoint: context.endpoint.clone(),
        })
    }
}

impl std::fmt::Debug for ResponseSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseSigner").finish_non_exhaustive()
    }
}

/// Header values that authenticate one response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSignature {
    pub signature: String,
    pub timestamp: String,
    pub endpoint: String,
}

impl ResponseSignature {
    /// Write `X-Signature`, `X-Timestamp`, `X-Endpoint` and
    /// `Content-Type: application/json`.
    ///
    /// Must run before any body bytes are written.
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<(), SigningError> {
        let value = |name: &'static str, text: &str| {
            HeaderValue::from_str(text).map_err(|_| SigningError::InvalidHeaderValue(name))
        };

        headers.insert(X_SIGNATURE, value(X_SIGNATURE, &self.signature)?);
        headers.insert(X_TIMESTAMP, value(X_TIMESTAMP, &self.timestamp)?);
        headers.insert(X_ENDPOINT, value(X_ENDPOINT, &self.endpoint)?);
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Ok(())
    }
}
