use super::VerificationError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt;
use std::str::FromStr;

/// Signature algorithms accepted in the `x-signature` header
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    HmacSha256,
}

impl SignatureAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HmacSha256 => "hmac-sha256",
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = VerificationError;

    /// Exact, case-sensitive match on the algorithm tag
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hmac-sha256" => Ok(Self::HmacSha256),
            other => Err(VerificationError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// Parsed `x-signature` value: `<algorithm> <base64 signature>`.
///
/// The algorithm tag and the signature are separated by exactly one space.
/// Only the first space splits; the signature text is kept as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureHeader<'a> {
    algorithm: SignatureAlgorithm,
    encoded: &'a str,
}

impl<'a> SignatureHeader<'a> {
    /// Parse a raw header value.
    ///
    /// # Errors
    ///
    /// [`VerificationError::UnsupportedAlgorithm`] when there is no space
    /// separator or the tag before it is not a supported algorithm. The
    /// error carries the tag that was received (or the whole value when no
    /// separator exists).
    pub fn parse(value: &'a str) -> Result<Self, VerificationError> {
        let Some((tag, encoded)) = value.split_once(' ') else {
            return Err(VerificationError::UnsupportedAlgorithm(value.to_string()));
        };

        Ok(Self {
            algorithm: tag.parse()?,
            encoded,
        })
    }

    pub(crate) fn from_parts(algorithm: SignatureAlgorithm, encoded: &'a str) -> Self {
        Self { algorithm, encoded }
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    /// The base64 signature text, after the algorithm prefix
    pub fn encoded(&self) -> &'a str {
        self.encoded
    }

    /// Decode the signature text into raw tag bytes
    pub fn decode(&self) -> Result<Vec<u8>, VerificationError> {
        STANDARD
            .decode(self.encoded)
            .map_err(|_| VerificationError::MalformedSignature)
    }
}

/// Format a tag as a header value: `hmac-sha256 <base64>`
pub fn format_signature(algorithm: SignatureAlgorithm, tag: &[u8]) -> String {
    format!("{} {}", algorithm, STANDARD.encode(tag))
}
