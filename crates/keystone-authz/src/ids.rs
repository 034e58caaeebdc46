//! Opaque high-entropy identifiers.
//!
//! Token ids and ticket ids share the same shape: 18 random bytes (144 bits,
//! comfortably above the 128-bit floor both call for) rendered as unpadded
//! base64url so the result is URL-safe without further escaping.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;

/// Generate a fresh, URL-safe, high-entropy identifier.
pub fn generate_id() -> String {
    let mut bytes = [0u8; 18];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
