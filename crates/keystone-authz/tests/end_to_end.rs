//! End-to-end scenarios spanning issuance, attenuation, revocation, tickets,
//! and validation together, as opposed to the per-module unit tests in
//! `src/`.

use std::collections::BTreeSet;
use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{Duration, TimeZone, Utc};

use keystone_authz::capability::token::Permission;
use keystone_authz::errors::{AttenuationError, TicketError};
use keystone_authz::{
    derive, ip_allowlist, nonce_matches, time_window, validate_request, Decision, Proof,
    Revocable, RevocationIndex, RequestContext, Ticket, TicketStore, Token,
};

const KEY: &[u8] = b"test-key";

fn t0() -> chrono::DateTime<Utc> {
    Utc.timestamp_opt(1_735_689_600, 0).unwrap() // 2025-01-01T00:00:00Z
}

fn perms(pairs: &[(&str, &str)]) -> BTreeSet<Permission> {
    pairs.iter().map(|(a, r)| (a.to_string(), r.to_string())).collect()
}

fn proof_with_fp(fp: &str) -> Proof {
    [("holder_key_fingerprint".to_string(), fp.to_string())].into()
}

#[test]
fn happy_path_end_to_end() {
    let token = Token::issue(
        perms(&[("read", "/r")]),
        t0() + Duration::minutes(5),
        "a",
        vec![],
        "fp",
        KEY,
        Some(t0()),
        None,
    )
    .unwrap();
    let ctx = RequestContext::new("read", "/r", "a", t0());
    let decision = validate_request(&token, &ctx, &proof_with_fp("fp"), KEY, None, None);
    assert_eq!(decision, Decision::allow());
}

#[test]
fn attenuation_then_validation_respects_narrowed_scope() {
    let parent = Token::issue(
        perms(&[("read", "/r"), ("write", "/r")]),
        t0() + Duration::minutes(10),
        "a",
        vec![],
        "fp",
        KEY,
        Some(t0()),
        None,
    )
    .unwrap();

    let child = derive(
        &parent,
        perms(&[("read", "/r")]),
        vec![nonce_matches("n1")],
        t0() + Duration::seconds(1),
        KEY,
    )
    .unwrap();

    let ctx_write = RequestContext::new("write", "/r", "a", t0() + Duration::seconds(2));
    let decision = validate_request(&child, &ctx_write, &proof_with_fp("fp"), KEY, None, None);
    assert_eq!(decision.reason.as_deref(), Some("permission_missing"));

    let ctx_read = RequestContext::new("read", "/r", "a", t0() + Duration::seconds(2))
        .with_device_nonce("n1");
    let decision = validate_request(&child, &ctx_read, &proof_with_fp("fp"), KEY, None, None);
    assert_eq!(decision, Decision::allow());
}

#[test]
fn attenuation_widening_is_rejected() {
    let parent = Token::issue(
        perms(&[("read", "/r")]),
        t0() + Duration::minutes(10),
        "a",
        vec![],
        "fp",
        KEY,
        Some(t0()),
        None,
    )
    .unwrap();

    let err = derive(
        &parent,
        perms(&[("read", "/r"), ("write", "/r")]),
        vec![],
        t0() + Duration::seconds(1),
        KEY,
    )
    .unwrap_err();
    assert_matches!(err, AttenuationError::Widening);
}

#[test]
fn revocation_is_observed_across_a_shared_index() {
    let token = Token::issue(
        perms(&[("read", "/r")]),
        t0() + Duration::minutes(5),
        "a",
        vec![],
        "fp",
        KEY,
        Some(t0()),
        None,
    )
    .unwrap();
    let index = RevocationIndex::new();

    let ctx = RequestContext::new("read", "/r", "a", t0());
    assert_eq!(
        validate_request(&token, &ctx, &proof_with_fp("fp"), KEY, Some(&index), None),
        Decision::allow()
    );

    index.revoke(Revocable::Token(&token), t0(), Some(60)).unwrap();
    let decision = validate_request(&token, &ctx, &proof_with_fp("fp"), KEY, Some(&index), None);
    assert_eq!(decision.reason.as_deref(), Some("revoked"));

    let later = RequestContext::new("read", "/r", "a", t0() + Duration::seconds(61));
    assert_eq!(
        validate_request(&token, &later, &proof_with_fp("fp"), KEY, Some(&index), None),
        Decision::allow()
    );
}

#[test]
fn multi_caveat_token_enforces_every_caveat_in_order() {
    let token = Token::issue(
        perms(&[("read", "/r")]),
        t0() + Duration::minutes(5),
        "a",
        vec![
            ip_allowlist(["127.0.0.1".to_string()]),
            time_window(
                t0().timestamp() as f64,
                (t0() + Duration::minutes(5)).timestamp() as f64,
            ),
        ],
        "fp",
        KEY,
        Some(t0()),
        None,
    )
    .unwrap();

    let good_ctx = RequestContext::new("read", "/r", "a", t0()).with_ip("127.0.0.1");
    assert_eq!(
        validate_request(&token, &good_ctx, &proof_with_fp("fp"), KEY, None, None),
        Decision::allow()
    );

    let wrong_ip = RequestContext::new("read", "/r", "a", t0()).with_ip("10.0.0.1");
    let decision = validate_request(&token, &wrong_ip, &proof_with_fp("fp"), KEY, None, None);
    assert_eq!(decision.reason.as_deref(), Some("caveat_failed"));
}

#[test]
fn ticket_double_redeem_fails_second_time() {
    let store = TicketStore::new();
    let Ticket { ticket_id, .. } = store.mint(30, Some(t0())).unwrap();
    store.redeem(&ticket_id, "rp", t0()).unwrap();
    let err = store.redeem(&ticket_id, "rp", t0()).unwrap_err();
    assert_matches!(err, TicketError::AlreadyRedeemed);
}

#[test]
fn concurrent_validators_agree_after_a_revoke_happens_before() {
    let token = Arc::new(
        Token::issue(
            perms(&[("read", "/r")]),
            t0() + Duration::minutes(5),
            "a",
            vec![],
            "fp",
            KEY,
            Some(t0()),
            None,
        )
        .unwrap(),
    );
    let index = Arc::new(RevocationIndex::new());
    index.revoke(Revocable::Token(&token), t0(), Some(60)).unwrap();

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let token = token.clone();
            let index = index.clone();
            scope.spawn(move || {
                let ctx = RequestContext::new("read", "/r", "a", t0() + Duration::seconds(1));
                let decision =
                    validate_request(&token, &ctx, &proof_with_fp("fp"), KEY, Some(&index), None);
                assert_eq!(decision.reason.as_deref(), Some("revoked"));
            });
        }
    });
}
