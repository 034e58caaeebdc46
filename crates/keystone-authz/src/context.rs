//! The request under evaluation, and the proof-of-possession bundle presented
//! alongside it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// A concrete request a resource server is deciding allow/deny for.
///
/// `now` is always treated as UTC — there is no naive-instant ambiguity here
/// because [`DateTime<Utc>`] has no naive representation to begin with; a
/// caller working from a wall clock or an offset-bearing wire timestamp
/// converts to UTC at the boundary, once, rather than this core silently
/// assuming an offset for it.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub action: String,
    pub resource: String,
    pub aud: String,
    pub now: DateTime<Utc>,
    pub ip: Option<String>,
    pub device_nonce: Option<String>,
    pub method: Option<String>,
}

impl RequestContext {
    /// Build a context with only the fields every request carries; the
    /// optional fields default to `None` and are set with the `with_*`
    /// builders below.
    pub fn new(
        action: impl Into<String>,
        resource: impl Into<String>,
        aud: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            action: action.into(),
            resource: resource.into(),
            aud: aud.into(),
            now,
            ip: None,
            device_nonce: None,
            method: None,
        }
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    pub fn with_device_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.device_nonce = Some(nonce.into());
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }
}

/// Proof-of-possession payload presented alongside a token.
///
/// The default verifier looks for a `holder_key_fingerprint` or `pubkey`
/// entry matching the token's bound fingerprint; an injected `proof_verifier`
/// may interpret this map however the resource server needs.
pub type Proof = HashMap<String, String>;
