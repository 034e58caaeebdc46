//! Transit-layer interfaces: encryption wrappers and alternate wire
//! serializations, pluggable rather than implemented by this core.
//!
//! The original transit cipher is a literal passthrough pending a real
//! AES-GCM implementation (see `original_source/crypto.py`), and the
//! original wire serializer is a demo JWT variant. Neither belongs in an
//! authorization core: this module defines the traits an outer layer must
//! satisfy and stops there (§9/§10.2 of the design notes).

use crate::capability::Token;

/// Wraps a [`Token`] for transport. Implementations may encrypt, compress,
/// or otherwise transform the bytes; this core has no opinion on which.
pub trait TransitCipher {
    type Error;

    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, Self::Error>;
    fn open(&self, ciphertext: &[u8]) -> Result<Vec<u8>, Self::Error>;
}

/// An alternate wire encoding for a [`Token`] — e.g. a JWT-shaped variant —
/// distinct from the canonical payload used for signing
/// ([`crate::canonical`]). A `TokenSerializer` only needs to round-trip the
/// fields a `Token` already carries; it does not get to invent new signed
/// content.
pub trait TokenSerializer {
    type Error;

    fn encode(&self, token: &Token) -> Result<Vec<u8>, Self::Error>;
    fn decode(&self, bytes: &[u8]) -> Result<Token, Self::Error>;
}
