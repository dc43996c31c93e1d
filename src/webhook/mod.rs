//! Incoming webhook authentication.
//!
//! Deliveries carry a hex HMAC-SHA256 digest of the raw body under the
//! webhook's shared secret. Verify against the raw bytes before parsing.

mod signature;


pub use signature::{
    INVALID_SIGNATURE, SIGNATURE_LEN, parse_webhook_payload, sign_webhook_payload,
    verify_webhook_signature,
};
