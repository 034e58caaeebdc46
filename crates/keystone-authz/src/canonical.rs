//! Canonical payload construction for signing and content-addressed ids.
//!
//! A token's signature covers exactly the bytes produced here — `token_id`,
//! `permissions`, `exp`, `aud`, `caveats`, `holder_key_fingerprint` — and
//! nothing else; re-serializing the same logical payload must always
//! produce the same bytes. `serde_json::Map` is backed by a `BTreeMap`
//! (ascending key order) as long as the `preserve_order` feature stays off
//! workspace-wide, so building the payload with [`serde_json::json!`] and
//! serializing with [`serde_json::to_vec`] already gives sorted-key, compact
//! JSON with no extra bookkeeping. This schema is the core's only external
//! interface (see §6 of the design notes) and must stay bit-exact.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::caveats::Caveat;

/// Render an instant the same way every time it crosses into a signed
/// payload: RFC 3339, UTC (`Z`), microsecond precision.
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Build the canonical JSON value covered by a token's signature.
///
/// `permissions` is sorted ascending before being embedded, so two tokens
/// with the same permission set in different construction order produce
/// identical bytes. `caveat_ids` is the caveats' stable ids, in attachment
/// order — caveat order is signal (it's part of `exp`endable derivation
/// history) and is preserved verbatim, unlike permissions.
pub fn canonical_payload(
    token_id: &str,
    permissions: &[(String, String)],
    exp: DateTime<Utc>,
    aud: &str,
    caveat_ids: &[String],
    holder_key_fingerprint: &str,
) -> Value {
    let mut sorted_permissions: Vec<&(String, String)> = permissions.iter().collect();
    sorted_permissions.sort();
    let permissions: Vec<[&str; 2]> = sorted_permissions
        .iter()
        .map(|(action, resource)| [action.as_str(), resource.as_str()])
        .collect();

    json!({
        "aud": aud,
        "caveats": caveat_ids,
        "exp": format_instant(exp),
        "holder_key_fingerprint": holder_key_fingerprint,
        "permissions": permissions,
        "token_id": token_id,
    })
}

/// Serialize a canonical payload to the exact bytes a signature covers.
pub fn canonical_bytes(payload: &Value) -> Vec<u8> {
    serde_json::to_vec(payload).expect("canonical payload values always serialize")
}

/// Extract the caveat ids, in attachment order, for building a canonical
/// payload from a live `Caveat` list.
pub fn caveat_ids(caveats: &[Caveat]) -> Vec<String> {
    caveats.iter().map(|c| c.id().to_string()).collect()
}
