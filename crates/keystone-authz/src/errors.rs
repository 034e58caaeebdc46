//! Error taxonomy for the authorization core.
//!
//! Each subsystem gets its own enum rather than one crate-wide error: issuance,
//! attenuation, revocation, and tickets are independent failure domains with
//! no overlap, and callers usually only handle one of them at a call site.
//! The validator is the exception — it never returns an `Err` at all; every
//! condition below is instead folded into a [`Decision`](crate::validator::Decision)
//! reason string (see `validator.rs`).

/// Errors raised while issuing a new capability token.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TokenError {
    /// Empty permission set, an empty action/resource, or a non-future `exp`.
    #[error("invalid token: {0}")]
    InvalidToken(String),
}

/// Errors raised while deriving an attenuated token from a parent.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AttenuationError {
    /// The requested permission set was empty.
    #[error("attenuation failed: derived permissions must be non-empty")]
    EmptyPermissions,

    /// The requested permissions were not a subset of the parent's.
    #[error("attenuation failed: permission widening is not allowed")]
    Widening,

    /// The parent token had already expired at the attenuation instant.
    #[error("attenuation failed: parent token expired")]
    ParentExpired,
}

/// Errors raised by the single-use ticket store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TicketError {
    /// `mint` was called with a non-positive TTL.
    #[error("ttl_seconds must be positive")]
    InvalidTtl,

    /// `redeem` referenced a ticket id the store has never seen (or has
    /// already evicted).
    #[error("ticket not found")]
    NotFound,

    /// `redeem` was called after `expires_at`; the record is removed.
    #[error("ticket expired")]
    Expired,

    /// `redeem` was called on a ticket that already succeeded once.
    #[error("ticket already redeemed")]
    AlreadyRedeemed,
}

/// Errors raised by the revocation index.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RevocationError {
    /// A string id was revoked without a `ttl_seconds`, or `ttl_seconds` was
    /// non-positive.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
