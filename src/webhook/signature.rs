//! HMAC-SHA256 webhook signatures.

use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use sha2::Sha256;

use crate::{SdkError, SdkResult};

type HmacSha256 = Hmac<Sha256>;

/// Length in bytes of a decoded signature.
pub const SIGNATURE_LEN: usize = 32;

/// Message of the error returned for a signature mismatch.
pub const INVALID_SIGNATURE: &str = "Invalid webhook signature";

fn keyed(secret: &str) -> Option<HmacSha256> {
    HmacSha256::new_from_slice(secret.as_bytes()).ok()
}

/// Computes the hex HMAC-SHA256 digest of `payload` under `secret`.
///
/// # Errors
///
/// Returns an error if `secret` cannot key the MAC.
pub fn sign_webhook_payload(payload: impl AsRef<[u8]>, secret: &str) -> SdkResult<String> {
    let mut mac = keyed(secret)
        .ok_or_else(|| SdkError::sdk("Webhook secret is not a usable HMAC key"))?;
    mac.update(payload.as_ref());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Checks a hex `signature` against the digest of `payload` under `secret`.
///
/// The signature must be exactly the lowercase hex form produced by
/// [`sign_webhook_payload`]. Uppercase digits, surrounding whitespace and
/// wrong lengths are rejected before the constant-time comparison.
#[must_use]
pub fn verify_webhook_signature(payload: impl AsRef<[u8]>, signature: &str, secret: &str) -> bool {
    if !is_lowercase_hex_digest(signature) {
        return false;
    }
    let Ok(expected) = hex::decode(signature) else {
        return false;
    };
    let Some(mut mac) = keyed(secret) else {
        return false;
    };

    mac.update(payload.as_ref());
    mac.verify_slice(&expected).is_ok()
}

fn is_lowercase_hex_digest(signature: &str) -> bool {
    signature.len() == SIGNATURE_LEN * 2
        && signature
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Verifies `payload` and decodes it as JSON.
///
/// # Errors
///
/// - status 401 with [`INVALID_SIGNATURE`] when the signature does not match
/// - status 400 when the verified payload is not valid JSON for `T`
pub fn parse_webhook_payload<T: DeserializeOwned>(
    payload: impl AsRef<[u8]>,
    signature: &str,
    secret: &str,
) -> SdkResult<T> {
    let payload = payload.as_ref();
    if !verify_webhook_signature(payload, signature, secret) {
        tracing::warn!(
            len = payload.len(),
            "Rejected webhook with invalid signature"
        );
        return Err(SdkError::with_status(INVALID_SIGNATURE, 401));
    }

    serde_json::from_slice(payload).map_err(|e| SdkError::Sdk {
        message: format!("Invalid webhook payload: {e}"),
        status: Some(400),
        source: Some(Box::new(e)),
    })
}
