//! A time-bounded revocation index with lazy eviction.
//!
//! Grounded on the teacher's `EffectCache<T>` (`aura-agent/src/optimizations/caching.rs`):
//! both are a `parking_lot`-guarded map with a TTL, where reads opportunistically
//! evict expired entries under the same lock that serves them, so there is no
//! separate sweeper thread and no window where a read can observe a stale hit.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::capability::Token;
use crate::errors::RevocationError;

/// Either a live token or a caller-supplied string id — the two ways a
/// caller may address a revocation entry.
#[derive(Debug, Clone, Copy)]
pub enum Revocable<'a> {
    Token(&'a Token),
    Id(&'a str),
}

fn revocation_id(target: &Revocable<'_>) -> String {
    match target {
        Revocable::Token(token) => keystone_crypto::sha256_hex(&token.canonical_bytes()),
        Revocable::Id(id) => id.to_string(),
    }
}

/// An in-memory `revocation_id -> revoked_until` index.
///
/// `revoke`, `is_revoked`, and `purge` each take the single internal mutex
/// exclusively; there is deliberately no separate read path, since a
/// revocation check that raced an eviction would be the kind of bug this
/// design specifically rules out (see §5 of the design notes).
#[derive(Default)]
pub struct RevocationIndex {
    entries: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl RevocationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revoke a token or a caller-supplied id.
    ///
    /// When `target` is a [`Revocable::Token`], `ttl_seconds` is optional:
    /// omitting it revokes through the token's own `exp`. When `target` is a
    /// [`Revocable::Id`], `ttl_seconds` is required. In both cases a supplied
    /// `ttl_seconds` must be strictly positive.
    pub fn revoke(
        &self,
        target: Revocable<'_>,
        now: DateTime<Utc>,
        ttl_seconds: Option<i64>,
    ) -> Result<String, RevocationError> {
        if let Some(ttl) = ttl_seconds {
            if ttl <= 0 {
                return Err(RevocationError::InvalidArgument(
                    "ttl_seconds must be positive".into(),
                ));
            }
        }

        let token_exp = match &target {
            Revocable::Token(token) => Some(token.exp),
            Revocable::Id(_) => None,
        };

        let revoked_until = match (ttl_seconds, token_exp) {
            (Some(ttl), Some(exp)) => std::cmp::min(now + chrono::Duration::seconds(ttl), exp),
            (Some(ttl), None) => now + chrono::Duration::seconds(ttl),
            (None, Some(exp)) => exp,
            (None, None) => {
                return Err(RevocationError::InvalidArgument(
                    "ttl_seconds is required when revoking by id".into(),
                ))
            }
        };

        let id = revocation_id(&target);
        self.entries.lock().insert(id.clone(), revoked_until);
        debug!(revocation_id = %id, %revoked_until, "revoked");
        Ok(id)
    }

    /// True iff `target` is currently revoked as of `now`. An entry whose
    /// `revoked_until` has passed is removed as a side effect of this call,
    /// not just reported as absent.
    pub fn is_revoked(&self, target: Revocable<'_>, now: DateTime<Utc>) -> bool {
        let id = revocation_id(&target);
        let mut entries = self.entries.lock();
        match entries.get(&id) {
            None => false,
            Some(revoked_until) => {
                if now >= *revoked_until {
                    trace!(revocation_id = %id, "lazily evicting expired revocation entry");
                    entries.remove(&id);
                    false
                } else {
                    true
                }
            }
        }
    }

    /// Bulk-delete all entries whose `revoked_until` has passed as of `now`,
    /// returning the number removed.
    pub fn purge(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, revoked_until| now < *revoked_until);
        let removed = before - entries.len();
        if removed > 0 {
            trace!(removed, "purged expired revocation entries");
        }
        removed
    }
}
