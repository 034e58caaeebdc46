//! Token issuance.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::canonical::{canonical_bytes, canonical_payload, caveat_ids};
use crate::caveats::Caveat;
use crate::errors::TokenError;

/// An `(action, resource)` pair. Both components must be non-empty; this is
/// enforced at construction time in [`Token::issue`] and
/// [`crate::capability::derive`], not re-checked on every read.
pub type Permission = (String, String);

/// An immutable, signed capability token.
///
/// Nothing about a `Token` ever changes after [`Token::issue`] (or
/// [`crate::capability::derive`]) returns it — attenuation produces a new
/// `Token`, never mutates this one.
#[derive(Debug, Clone)]
pub struct Token {
    pub token_id: String,
    pub permissions: BTreeSet<Permission>,
    pub exp: DateTime<Utc>,
    pub aud: String,
    pub caveats: Vec<Caveat>,
    pub holder_key_fingerprint: String,
    pub alg: &'static str,
    pub signature: String,
}

impl Token {
    /// Mint a new token.
    ///
    /// `now` defaults to wall-clock UTC when `None`; `token_id` defaults to a
    /// fresh high-entropy id when `None`. Fails if `permissions` is empty, any
    /// permission has an empty component, or `exp` is not strictly after
    /// `now`.
    pub fn issue(
        permissions: BTreeSet<Permission>,
        exp: DateTime<Utc>,
        aud: impl Into<String>,
        caveats: Vec<Caveat>,
        holder_key_fingerprint: impl Into<String>,
        signing_key: &[u8],
        now: Option<DateTime<Utc>>,
        token_id: Option<String>,
    ) -> Result<Self, TokenError> {
        let now = now.unwrap_or_else(Utc::now);
        let aud = aud.into();
        let holder_key_fingerprint = holder_key_fingerprint.into();

        if permissions.is_empty() {
            return Err(TokenError::InvalidToken(
                "permissions must be non-empty".into(),
            ));
        }
        if permissions
            .iter()
            .any(|(action, resource)| action.is_empty() || resource.is_empty())
        {
            return Err(TokenError::InvalidToken(
                "permission action and resource must both be non-empty".into(),
            ));
        }
        if exp <= now {
            return Err(TokenError::InvalidToken(
                "exp must be strictly after now".into(),
            ));
        }

        let token_id = token_id.unwrap_or_else(crate::ids::generate_id);
        let permissions_vec: Vec<Permission> = permissions.iter().cloned().collect();
        let ids = caveat_ids(&caveats);
        let payload = canonical_payload(
            &token_id,
            &permissions_vec,
            exp,
            &aud,
            &ids,
            &holder_key_fingerprint,
        );
        let signature = keystone_crypto::sign(&canonical_bytes(&payload), signing_key);

        debug!(token_id = %token_id, aud = %aud, "issued capability token");

        Ok(Self {
            token_id,
            permissions,
            exp,
            aud,
            caveats,
            holder_key_fingerprint,
            alg: keystone_crypto::ALG,
            signature,
        })
    }

    /// The canonical JSON payload this token's signature and any derived
    /// revocation id are computed over.
    pub fn canonical_payload(&self) -> serde_json::Value {
        let permissions_vec: Vec<Permission> = self.permissions.iter().cloned().collect();
        let ids = caveat_ids(&self.caveats);
        canonical_payload(
            &self.token_id,
            &permissions_vec,
            self.exp,
            &self.aud,
            &ids,
            &self.holder_key_fingerprint,
        )
    }

    /// The exact bytes a signature (and a revocation id) is computed over.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        canonical_bytes(&self.canonical_payload())
    }
}
