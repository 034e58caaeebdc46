//! Attenuation: deriving a strictly-narrower token from a parent.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::token::{Permission, Token};
use crate::canonical::{canonical_bytes, canonical_payload, caveat_ids};
use crate::caveats::Caveat;
use crate::errors::AttenuationError;

/// Derive a narrower token from `parent`.
///
/// `narrower_perms` must be a non-empty subset of `parent.permissions`, and
/// `parent` must not yet have expired as of `now`. The result inherits
/// `exp`, `aud`, and `holder_key_fingerprint` from `parent` unchanged; its
/// caveats are `parent.caveats` followed by `extra_caveats`, in that order.
/// A fresh `token_id` is minted and the signature recomputed — attenuation
/// never reuses the parent's signature, since the signed payload (caveat
/// list, permission set) has changed.
pub fn derive(
    parent: &Token,
    narrower_perms: BTreeSet<Permission>,
    extra_caveats: Vec<Caveat>,
    now: DateTime<Utc>,
    signing_key: &[u8],
) -> Result<Token, AttenuationError> {
    if narrower_perms.is_empty() {
        return Err(AttenuationError::EmptyPermissions);
    }
    if !narrower_perms.is_subset(&parent.permissions) {
        return Err(AttenuationError::Widening);
    }
    if now >= parent.exp {
        return Err(AttenuationError::ParentExpired);
    }

    let mut caveats = parent.caveats.clone();
    caveats.extend(extra_caveats);

    let token_id = crate::ids::generate_id();
    let permissions_vec: Vec<Permission> = narrower_perms.iter().cloned().collect();
    let ids = caveat_ids(&caveats);
    let payload = canonical_payload(
        &token_id,
        &permissions_vec,
        parent.exp,
        &parent.aud,
        &ids,
        &parent.holder_key_fingerprint,
    );
    let signature = keystone_crypto::sign(&canonical_bytes(&payload), signing_key);

    debug!(
        parent_id = %parent.token_id,
        child_id = %token_id,
        "derived attenuated token"
    );

    Ok(Token {
        token_id,
        permissions: narrower_perms,
        exp: parent.exp,
        aud: parent.aud.clone(),
        caveats,
        holder_key_fingerprint: parent.holder_key_fingerprint.clone(),
        alg: keystone_crypto::ALG,
        signature,
    })
}
