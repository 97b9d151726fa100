//! Permanent identifier generation.
//!
//! Entities carry a random, URL-safe string identifier that stays stable
//! across edits, independent of the transport's own per-message numeric IDs.
//! No uniqueness check is performed against existing identifiers: at 16
//! random bytes the birthday-bound collision probability is negligible for
//! any realistic forum size.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::constants::{ENTITY_ID_BYTES, SHORT_ID_BYTES};

/// Generates a random identifier from `length` cryptographically random
/// bytes, encoded as URL-safe base64 without padding.
///
/// The output alphabet is `A-Z a-z 0-9 - _`, so the identifier can sit
/// unescaped on a card's line-oriented header (it can never contain a
/// newline).
pub fn generate_id(length: usize) -> String {
    let mut bytes = vec![0u8; length];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generates a permanent entity identifier (16 random bytes).
pub fn generate_entity_id() -> String {
    generate_id(ENTITY_ID_BYTES)
}

/// Generates a short-lived identifier (8 random bytes), used for transient
/// keys such as attachment placeholders.
pub fn generate_short_id() -> String {
    generate_id(SHORT_ID_BYTES)
}
