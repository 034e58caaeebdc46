//! Error types for the crypto primitives used by keystone's authorization core.

/// Errors raised by MAC signing and verification.
#[derive(Debug, Clone, thiserror::Error)]
pub enum IntegrityError {
    /// The token declares an `alg` this crate does not implement.
    #[error("unsupported integrity algorithm: {0}")]
    UnsupportedAlg(String),

    /// The recomputed MAC did not match the presented signature.
    #[error("signature mismatch")]
    SignatureMismatch,
}
