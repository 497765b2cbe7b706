use crate::credentials::SharedSecret;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Length of an HMAC-SHA256 tag in bytes
pub const TAG_LEN: usize = 32;

/// The exact byte sequence a signature commits to.
///
/// Timestamp, endpoint and body are concatenated in that order with no
/// separator. Header values are used exactly as they arrived and the body
/// exactly as it is (or will be) transmitted; re-serializing a JSON body
/// before building the message breaks the signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalMessage(Vec<u8>);

impl CanonicalMessage {
    /// Build `timestamp || endpoint || body`. A missing body contributes no bytes.
    pub fn new(timestamp: &str, endpoint: &str, body: Option<&[u8]>) -> Self {
        let body = body.unwrap_or_default();
        let mut bytes = Vec::with_capacity(timestamp.len() + endpoint.len() + body.len());
        bytes.extend_from_slice(timestamp.as_bytes());
        bytes.extend_from_slice(endpoint.as_bytes());
        bytes.extend_from_slice(body);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// HMAC-SHA256 of this message under `secret`
    pub fn tag(&self, secret: &SharedSecret) -> [u8; TAG_LEN] {
        compute_tag(secret.expose(), &self.0)
    }
}

/// Compute an HMAC-SHA256 tag
pub(crate) fn compute_tag(key: &[u8], message: &[u8]) -> [u8; TAG_LEN] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(message);

    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&mac.finalize().into_bytes());
    tag
}

/// Constant-time equality over the full length of both inputs.
///
/// Uses `subtle` so the comparison does not exit on the first differing
/// byte. Lengths are public (a tag is always 32 bytes), so a length mismatch
/// returns early.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.ct_eq(b).into()
}
