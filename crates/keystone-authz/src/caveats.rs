//! Caveats: named predicates over a [`RequestContext`], evaluated during
//! validation.
//!
//! Caveats are modeled as a tagged variant rather than a trait-object
//! dispatch table — the set of built-in shapes is small and fixed, and a
//! closed enum lets [`Caveat::id`] and [`Caveat::evaluate`] stay exhaustive
//! matches instead of virtual calls. [`custom`] is the escape hatch for an
//! embedder that needs a predicate outside the built-in three; its `id` must
//! still be supplied by the caller and must be stable, because it — and only
//! it — crosses into the signed canonical payload (see `canonical.rs`).

use std::collections::BTreeSet;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::context::RequestContext;

type CustomPredicate = Arc<dyn Fn(&RequestContext) -> bool + Send + Sync>;

/// A named predicate over a [`RequestContext`].
#[derive(Clone)]
pub enum Caveat {
    /// True iff `ctx.ip` is a member of `allowed`.
    IpAllowlist { id: String, allowed: BTreeSet<String> },
    /// True iff `not_before <= ctx.now.timestamp() <= not_after`.
    TimeWindow {
        id: String,
        not_before: f64,
        not_after: f64,
    },
    /// True iff `ctx.device_nonce == expected`.
    NonceMatches { id: String, expected: String },
    /// An embedder-supplied predicate outside the built-in three.
    Custom {
        id: String,
        predicate: CustomPredicate,
    },
}

impl fmt::Debug for Caveat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Caveat").field("id", &self.id()).finish()
    }
}

/// The outcome of evaluating a caveat's predicate.
///
/// `Fail` and `Error` are kept distinct so the validator can report
/// `caveat_failed` (the predicate computed and returned false) separately
/// from `caveat_error` (the predicate could not compute at all). The
/// distinction is made here, by the wrapper, not by the caller observing an
/// unwind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaveatOutcome {
    Pass,
    Fail,
    Error,
}

impl Caveat {
    /// The stable id used in canonicalization and as an attenuation
    /// fingerprint. Two caveats with equal ids are semantically
    /// interchangeable.
    pub fn id(&self) -> &str {
        match self {
            Caveat::IpAllowlist { id, .. }
            | Caveat::TimeWindow { id, .. }
            | Caveat::NonceMatches { id, .. }
            | Caveat::Custom { id, .. } => id,
        }
    }

    /// Evaluate the predicate against `ctx`.
    ///
    /// The built-in variants are total functions over their inputs — missing
    /// context fields simply fail the predicate. [`Caveat::Custom`] wraps an
    /// arbitrary closure, which is the only variant that can misbehave
    /// (panic); that panic is caught here and reported as
    /// [`CaveatOutcome::Error`] rather than unwinding into the validator.
    pub fn evaluate(&self, ctx: &RequestContext) -> CaveatOutcome {
        match catch_unwind(AssertUnwindSafe(|| self.evaluate_inner(ctx))) {
            Ok(true) => CaveatOutcome::Pass,
            Ok(false) => CaveatOutcome::Fail,
            Err(_) => CaveatOutcome::Error,
        }
    }

    fn evaluate_inner(&self, ctx: &RequestContext) -> bool {
        match self {
            Caveat::IpAllowlist { allowed, .. } => {
                ctx.ip.as_deref().is_some_and(|ip| allowed.contains(ip))
            }
            Caveat::TimeWindow {
                not_before,
                not_after,
                ..
            } => {
                let ts = ctx.now.timestamp() as f64
                    + f64::from(ctx.now.timestamp_subsec_nanos()) / 1e9;
                *not_before <= ts && ts <= *not_after
            }
            Caveat::NonceMatches { expected, .. } => {
                ctx.device_nonce.as_deref() == Some(expected.as_str())
            }
            Caveat::Custom { predicate, .. } => predicate(ctx),
        }
    }
}

/// Build an `ip_allowlist` caveat. `id = "ip_allowlist:" + sorted, comma-joined members`.
pub fn ip_allowlist(allowed: impl IntoIterator<Item = String>) -> Caveat {
    let allowed: BTreeSet<String> = allowed.into_iter().collect();
    let id = format!("ip_allowlist:{}", allowed.iter().cloned().collect::<Vec<_>>().join(","));
    Caveat::IpAllowlist { id, allowed }
}

/// Build a `time_window` caveat over `[not_before, not_after]`, as seconds
/// since the epoch. `id = "time_window:{not_before}:{not_after}"`.
pub fn time_window(not_before: f64, not_after: f64) -> Caveat {
    let id = format!("time_window:{not_before}:{not_after}");
    Caveat::TimeWindow {
        id,
        not_before,
        not_after,
    }
}

/// Build a `nonce_matches` caveat. `id = "nonce_matches:" + expected`.
pub fn nonce_matches(expected: impl Into<String>) -> Caveat {
    let expected = expected.into();
    let id = format!("nonce_matches:{expected}");
    Caveat::NonceMatches { id, expected }
}

/// Build a caveat from an arbitrary predicate. `id` is supplied by the
/// caller and must be stable across reissuance — it is what the signature
/// commits to.
pub fn custom(
    id: impl Into<String>,
    predicate: impl Fn(&RequestContext) -> bool + Send + Sync + 'static,
) -> Caveat {
    Caveat::Custom {
        id: id.into(),
        predicate: Arc::new(predicate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ctx() -> RequestContext {
        RequestContext::new("read", "/r", "aud1", Utc.timestamp_opt(1_700_000_000, 0).unwrap())
    }

    use chrono::Utc;

    #[test]
    fn ip_allowlist_matches_and_denies() {
        let caveat = ip_allowlist(["127.0.0.1".to_string()]);
        assert_eq!(
            caveat.evaluate(&ctx().with_ip("127.0.0.1")),
            CaveatOutcome::Pass
        );
        assert_eq!(
            caveat.evaluate(&ctx().with_ip("10.0.0.1")),
            CaveatOutcome::Fail
        );
        assert_eq!(caveat.evaluate(&ctx()), CaveatOutcome::Fail);
    }

    #[test]
    fn ip_allowlist_id_is_sorted_and_joined() {
        let caveat = ip_allowlist(["10.0.0.2".to_string(), "10.0.0.1".to_string()]);
        assert_eq!(caveat.id(), "ip_allowlist:10.0.0.1,10.0.0.2");
    }

    #[test]
    fn time_window_bounds_are_inclusive() {
        let now = ctx().now;
        let ts = now.timestamp() as f64;
        let caveat = time_window(ts - 5.0, ts + 5.0);
        assert_eq!(caveat.evaluate(&ctx()), CaveatOutcome::Pass);

        let outside = RequestContext::new(
            "read",
            "/r",
            "aud1",
            now + chrono::Duration::seconds(10),
        );
        assert_eq!(caveat.evaluate(&outside), CaveatOutcome::Fail);
    }

    #[test]
    fn nonce_matches_requires_exact_match() {
        let caveat = nonce_matches("nonce-123");
        assert_eq!(
            caveat.evaluate(&ctx().with_device_nonce("nonce-123")),
            CaveatOutcome::Pass
        );
        assert_eq!(
            caveat.evaluate(&ctx().with_device_nonce("nonce-999")),
            CaveatOutcome::Fail
        );
    }

    #[test]
    fn empty_ip_allowlist_always_denies() {
        let caveat = ip_allowlist(std::iter::empty());
        assert_eq!(
            caveat.evaluate(&ctx().with_ip("127.0.0.1")),
            CaveatOutcome::Fail
        );
    }

    #[test]
    fn custom_panic_surfaces_as_error() {
        let caveat = custom("boom", |_ctx| panic!("predicate cannot compute"));
        assert_eq!(caveat.evaluate(&ctx()), CaveatOutcome::Error);
    }

    #[test]
    fn custom_predicate_evaluates_normally() {
        let caveat = custom("method_is_get", |ctx| ctx.method.as_deref() == Some("GET"));
        assert_eq!(
            caveat.evaluate(&ctx().with_method("GET")),
            CaveatOutcome::Pass
        );
    }
}
