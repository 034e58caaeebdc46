//! Pure content-hashing helpers.
//!
//! Hashing here is only ever used to derive a stable, collision-resistant
//! identifier from a byte string (the canonical token payload) — never as a
//! building block for the MAC itself. Keeping it in its own module means the
//! algorithm can be swapped without touching call sites.
//!
//! Current algorithm: **SHA-256** (32-byte digest), matching the revocation-id
//! derivation the authorization core depends on.

#![allow(clippy::disallowed_types, clippy::disallowed_methods)]

use sha2::{Digest, Sha256};

/// SHA-256 digest of `bytes`, as a 32-byte array.
pub fn sha256(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

/// SHA-256 digest of `bytes`, hex-encoded (lowercase, no prefix).
///
/// This is the exact form a revocation index uses as its lookup key when the
/// caller presents a token rather than a caller-supplied string id.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(sha256(bytes))
}
