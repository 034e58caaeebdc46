//! Request validation: the ordered pipeline from `(token, context, proof)` to
//! an allow/deny [`Decision`].

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::debug;

use crate::capability::Token;
use crate::caveats::CaveatOutcome;
use crate::context::{Proof, RequestContext};
use crate::revocation::{Revocable, RevocationIndex};

/// The outcome of [`validate_request`]. `ALLOW` is the single successful
/// value; every denial carries one of a fixed set of reason strings (see
/// the module doc on [`validate_request`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl Decision {
    pub const fn allow() -> Self {
        Decision {
            allowed: true,
            reason: None,
        }
    }

    fn deny(reason: &'static str) -> Self {
        Decision {
            allowed: false,
            reason: Some(reason.to_string()),
        }
    }
}

/// A pluggable replacement for the default proof-of-possession rule.
///
/// Receives `(token, ctx, proof)` and returns whether the proof demonstrates
/// possession of the key bound into the token. Passed by reference so a
/// single verifier can be shared across many `validate_request` calls.
pub type ProofVerifier = dyn Fn(&Token, &RequestContext, &Proof) -> bool + Send + Sync;

fn default_proof_verifier(token: &Token, _ctx: &RequestContext, proof: &Proof) -> bool {
    proof
        .get("holder_key_fingerprint")
        .or_else(|| proof.get("pubkey"))
        .is_some_and(|candidate| candidate == &token.holder_key_fingerprint)
}

fn permission_matches(token: &Token, ctx: &RequestContext) -> bool {
    token.permissions.iter().any(|(action, resource)| {
        if action != &ctx.action {
            return false;
        }
        resource == &ctx.resource
            || (resource.ends_with('/') && ctx.resource.starts_with(resource.as_str()))
            || resource == "/"
    })
}

/// Every way the pipeline can deny, as a plain error enum. `?` against this
/// inside [`validate_request_inner`] is what makes the "first failure wins"
/// ordering read as ordinary early-return control flow rather than a chain
/// of hand-rolled `if ... { return ... }` checks; the public surface never
/// sees this type; [`Decision::from`] is where it collapses to the §7
/// reason vocabulary.
enum Denial {
    Revoked,
    RevocationError,
    Integrity,
    Expired,
    AudienceMismatch,
    InvalidProof,
    PermissionMissing,
    CaveatFailed,
    CaveatError,
}

impl From<Denial> for Decision {
    fn from(denial: Denial) -> Self {
        Decision::deny(match denial {
            Denial::Revoked => "revoked",
            Denial::RevocationError => "revocation_error",
            Denial::Integrity => "error",
            Denial::Expired => "expired",
            Denial::AudienceMismatch => "audience_mismatch",
            Denial::InvalidProof => "invalid_proof",
            Denial::PermissionMissing => "permission_missing",
            Denial::CaveatFailed => "caveat_failed",
            Denial::CaveatError => "caveat_error",
        })
    }
}

/// Run the full validation pipeline and return a [`Decision`] — never an
/// error.
///
/// Checks run in this fixed order; the first failure is the reported
/// reason, and later checks never run once an earlier one has failed:
///
/// 1. Revocation (only when `revocation_index` is `Some`) — `revoked` /
///    `revocation_error`.
/// 2. Integrity (`verify`) — `error`.
/// 3. Expiry — `expired`.
/// 4. Audience — `audience_mismatch`.
/// 5. Proof-of-possession — `invalid_proof`.
/// 6. Permission match (exact, hierarchical-prefix, or `"/"` wildcard) —
///    `permission_missing`.
/// 7. Caveats, in order — `caveat_failed` / `caveat_error`.
///
/// Any unexpected panic anywhere in the pipeline is caught at the outer
/// boundary and reported as `error`; this wraps the entire body rather than
/// relying on each step to handle its own faults, matching the "validator
/// never raises" guarantee even against a bug in a step not otherwise
/// designed to fail closed.
#[allow(clippy::too_many_arguments)]
pub fn validate_request(
    token: &Token,
    ctx: &RequestContext,
    proof: &Proof,
    signing_key: &[u8],
    revocation_index: Option<&RevocationIndex>,
    proof_verifier: Option<&ProofVerifier>,
) -> Decision {
    match catch_unwind(AssertUnwindSafe(|| {
        validate_request_inner(token, ctx, proof, signing_key, revocation_index, proof_verifier)
    })) {
        Ok(Ok(())) => Decision::allow(),
        Ok(Err(denial)) => denial.into(),
        Err(_) => Decision::deny("error"),
    }
}

fn validate_request_inner(
    token: &Token,
    ctx: &RequestContext,
    proof: &Proof,
    signing_key: &[u8],
    revocation_index: Option<&RevocationIndex>,
    proof_verifier: Option<&ProofVerifier>,
) -> Result<(), Denial> {
    // 1. Revocation.
    if let Some(index) = revocation_index {
        let revoked = catch_unwind(AssertUnwindSafe(|| index.is_revoked(Revocable::Token(token), ctx.now)))
            .map_err(|_| Denial::RevocationError)?;
        if revoked {
            debug!(token_id = %token.token_id, "denied: revoked");
            return Err(Denial::Revoked);
        }
    }

    // 2. Integrity.
    keystone_crypto::verify(token.alg, &token.canonical_bytes(), &token.signature, signing_key)
        .map_err(|_| {
            debug!(token_id = %token.token_id, "denied: integrity check failed");
            Denial::Integrity
        })?;

    // 3. Expiry.
    if ctx.now >= token.exp {
        return Err(Denial::Expired);
    }

    // 4. Audience.
    if token.aud != ctx.aud {
        return Err(Denial::AudienceMismatch);
    }

    // 5. Proof-of-possession.
    let proof_ok = match proof_verifier {
        Some(verifier) => verifier(token, ctx, proof),
        None => default_proof_verifier(token, ctx, proof),
    };
    if !proof_ok {
        return Err(Denial::InvalidProof);
    }

    // 6. Permission match.
    if !permission_matches(token, ctx) {
        return Err(Denial::PermissionMissing);
    }

    // 7. Caveats, in order.
    for caveat in &token.caveats {
        match caveat.evaluate(ctx) {
            CaveatOutcome::Pass => {}
            CaveatOutcome::Fail => return Err(Denial::CaveatFailed),
            CaveatOutcome::Error => return Err(Denial::CaveatError),
        }
    }

    Ok(())
}
