//! Webhook signature verification (HMAC-SHA256).
//!
//! GitHub signs each delivery body with the app's webhook secret and sends the
//! digest as `X-Hub-Signature-256: sha256=<hex>`. Verification runs over the
//! raw body bytes, before any JSON parsing, and compares in constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const PREFIX: &str = "sha256=";

/// Why a delivery failed authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("missing X-Hub-Signature-256 header")]
    Missing,

    #[error("malformed signature header")]
    Malformed,

    #[error("signature does not match payload")]
    Mismatch,
}

/// Decodes a `sha256=<hex>` header into the raw digest bytes.
///
/// Returns `None` for any other shape. Never panics.
///
/// ```
/// use hubbot::webhooks::parse_signature_header;
///
/// assert_eq!(parse_signature_header("sha256=00ff"), Some(vec![0x00, 0xff]));
/// assert!(parse_signature_header("sha1=00ff").is_none());
/// assert!(parse_signature_header("sha256=zz").is_none());
/// ```
pub fn parse_signature_header(header: &str) -> Option<Vec<u8>> {
    hex::decode(header.strip_prefix(PREFIX)?).ok()
}

/// HMAC-SHA256 of `payload` under `secret`.
pub fn compute_signature(payload: &[u8], secret: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Renders a digest as a header value, `sha256=<lowercase hex>`.
pub fn format_signature_header(signature: &[u8]) -> String {
    format!("{PREFIX}{}", hex::encode(signature))
}

/// Authenticates `payload` against the (possibly absent) signature header.
pub fn check_signature(
    payload: &[u8],
    header: Option<&str>,
    secret: &[u8],
) -> Result<(), SignatureError> {
    let header = header.ok_or(SignatureError::Missing)?;
    let claimed = parse_signature_header(header).ok_or(SignatureError::Malformed)?;

    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| SignatureError::Mismatch)?;
    mac.update(payload);
    mac.verify_slice(&claimed)
        .map_err(|_| SignatureError::Mismatch)
}

/// Boolean form of [`check_signature`] for a header that is present.
///
/// ```
/// use hubbot::webhooks::{compute_signature, format_signature_header, verify_signature};
///
/// let header = format_signature_header(&compute_signature(b"{}", b"s3cret"));
/// assert!(verify_signature(b"{}", &header, b"s3cret"));
/// assert!(!verify_signature(b"{ }", &header, b"s3cret"));
/// ```
pub fn verify_signature(payload: &[u8], signature_header: &str, secret: &[u8]) -> bool {
    check_signature(payload, Some(signature_header), secret).is_ok()
}
