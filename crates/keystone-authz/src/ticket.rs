//! A single-use nonce facility used out-of-band to confirm enrollment.
//!
//! Grounded on the same `EffectCache<T>` TTL-map shape as [`crate::revocation`],
//! with one addition: `redeem` is a compare-and-set rather than a plain read,
//! so two threads racing to redeem the same ticket cannot both win.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::debug;

use crate::errors::TicketError;
use crate::ids::generate_id;

/// An opaque, single-use, high-entropy nonce.
#[derive(Debug, Clone)]
pub struct Ticket {
    pub ticket_id: String,
    pub expires_at: DateTime<Utc>,
}

struct TicketRecord {
    expires_at: DateTime<Utc>,
    redeemed: bool,
    rp_pubkey: Option<String>,
}

/// A process-wide (or host-scoped) store of outstanding tickets.
#[derive(Default)]
pub struct TicketStore {
    tickets: Mutex<HashMap<String, TicketRecord>>,
}

impl TicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh ticket, valid for `ttl_seconds` from `now`.
    pub fn mint(&self, ttl_seconds: i64, now: Option<DateTime<Utc>>) -> Result<Ticket, TicketError> {
        if ttl_seconds <= 0 {
            return Err(TicketError::InvalidTtl);
        }
        let now = now.unwrap_or_else(Utc::now);
        let ticket_id = generate_id();
        let expires_at = now + chrono::Duration::seconds(ttl_seconds);

        self.tickets.lock().insert(
            ticket_id.clone(),
            TicketRecord {
                expires_at,
                redeemed: false,
                rp_pubkey: None,
            },
        );
        debug!(ticket_id = %ticket_id, %expires_at, "minted ticket");

        Ok(Ticket {
            ticket_id,
            expires_at,
        })
    }

    /// Redeem `ticket_id`, presenting `rp_pubkey` as the caller's identity.
    ///
    /// Succeeds at most once per ticket: the expiry check, the
    /// already-redeemed check, and the flip to `redeemed = true` all happen
    /// under one lock acquisition, so two concurrent callers cannot both
    /// observe `redeemed == false`.
    pub fn redeem(
        &self,
        ticket_id: &str,
        rp_pubkey: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), TicketError> {
        let mut tickets = self.tickets.lock();

        let expired = match tickets.get(ticket_id) {
            None => return Err(TicketError::NotFound),
            Some(record) => now >= record.expires_at,
        };
        if expired {
            tickets.remove(ticket_id);
            return Err(TicketError::Expired);
        }

        let record = tickets.get_mut(ticket_id).expect("checked present above");
        if record.redeemed {
            return Err(TicketError::AlreadyRedeemed);
        }
        record.redeemed = true;
        record.rp_pubkey = Some(rp_pubkey.into());
        debug!(ticket_id = %ticket_id, "redeemed ticket");
        Ok(())
    }

    /// The key presented by whoever redeemed `ticket_id`, if it has been
    /// redeemed. An audit or support-tooling read path separate from
    /// `redeem` itself, which only reports success/failure.
    pub fn redeemed_by(&self, ticket_id: &str) -> Option<String> {
        self.tickets.lock().get(ticket_id)?.rp_pubkey.clone()
    }
}
