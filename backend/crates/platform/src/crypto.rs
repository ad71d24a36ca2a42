//! Cryptographic Utilities
//!
//! Token framing primitives shared by every signed artifact:
//! - base64url codec (RFC 4648 §5 alphabet, padding stripped on encode,
//!   accepted or absent on decode)
//! - HMAC-SHA256 [`Signer`] with constant-time verification

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use hmac::{Hmac, Mac};
use rand::{RngCore, rngs::OsRng};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// URL-safe alphabet, no padding written, padding optional when reading.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Error decoding a base64url segment
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("Invalid base64url input: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Decoded bytes are not valid UTF-8")]
    InvalidUtf8,
}

/// Error producing a signature
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignerError {
    #[error("Signing secret is not configured")]
    EmptySecret,
}

/// Generate cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Encode bytes as unpadded base64url
pub fn encode_base64url(bytes: &[u8]) -> String {
    URL_SAFE_LENIENT.encode(bytes)
}

/// Encode the UTF-8 bytes of `text` as unpadded base64url
pub fn encode_base64url_text(text: &str) -> String {
    encode_base64url(text.as_bytes())
}

/// Decode base64url (padded or unpadded) to bytes
pub fn decode_base64url(input: &str) -> Result<Vec<u8>, CodecError> {
    Ok(URL_SAFE_LENIENT.decode(input)?)
}

/// Decode base64url to a UTF-8 string
pub fn decode_base64url_text(input: &str) -> Result<String, CodecError> {
    let bytes = decode_base64url(input)?;
    String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)
}

/// HMAC-SHA256 signer keyed by a shared secret.
///
/// An empty secret fails closed: [`Signer::sign`] refuses and
/// [`Signer::verify`] always returns `false`.
#[derive(Clone)]
pub struct Signer {
    secret: Vec<u8>,
}

impl Signer {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn has_secret(&self) -> bool {
        !self.secret.is_empty()
    }

    fn mac(&self) -> Option<HmacSha256> {
        if self.secret.is_empty() {
            return None;
        }
        // HMAC accepts keys of any length; only the empty key is rejected above.
        HmacSha256::new_from_slice(&self.secret).ok()
    }

    /// Sign `message` and return the base64url-encoded tag
    pub fn sign(&self, message: &str) -> Result<String, SignerError> {
        let mut mac = self.mac().ok_or(SignerError::EmptySecret)?;
        mac.update(message.as_bytes());
        Ok(encode_base64url(&mac.finalize().into_bytes()))
    }

    /// Check a base64url-encoded tag against `message` in constant time
    pub fn verify(&self, message: &str, signature: &str) -> bool {
        let Some(mut mac) = self.mac() else {
            return false;
        };
        let Ok(tag) = decode_base64url(signature) else {
            return false;
        };
        mac.update(message.as_bytes());
        mac.verify_slice(&tag).is_ok()
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
