//! HMAC-SHA256 signatures for partner webhooks.
//!
//! Inbound requests carry four headers:
//!
//! | Header        | Meaning                                        |
//! |---------------|------------------------------------------------|
//! | `x-endpoint`  | opaque endpoint string, echoed in the response |
//! | `x-timestamp` | opaque timestamp string, echoed in the response|
//! | `x-signature` | `hmac-sha256 <base64 tag>`                     |
//! | `x-api-key`   | key id used to look up the shared secret       |
//!
//! The tag is `HMAC-SHA256(secret, timestamp || endpoint || body)` over the
//! raw bytes, with no separators. Responses are signed the same way over the
//! response body and returned with `X-Signature`, `X-Timestamp` and
//! `X-Endpoint`.
//!
//! Freshness of `x-timestamp` is not checked here. Add a replay window in
//! the calling handler if your partner agreement needs one.

pub mod canonical;
pub mod header;
pub mod signer;
pub mod verifier;

pub use canonical::{CanonicalMessage, TAG_LEN, constant_time_eq};
pub use header::{SignatureAlgorithm, SignatureHeader, format_signature};
pub use signer::{ResponseSignature, ResponseSigner, SigningError};
pub use verifier::{
    HeaderLookup, SignatureVerifier, SignedRequestContext, VerificationError, VerifiedContext,
};

pub const X_ENDPOINT: &str = "x-endpoint";
pub const X_TIMESTAMP: &str = "x-timestamp";
pub const X_SIGNATURE: &str = "x-signature";
pub const X_API_KEY: &str = "x-api-key";
