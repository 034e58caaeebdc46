//! Keyed-MAC integrity over a canonical payload.
//!
//! This is the only integrity scheme the authorization core accepts: HMAC
//! with SHA-256, rendered as unpadded base64url. There is no negotiation —
//! [`ALG`] is the single algorithm identifier a [`Token`](../../keystone_authz/struct.Token.html)
//! may declare, and anything else is rejected by [`verify`] before the MAC is
//! even recomputed.

use base64::Engine as _;
use hmac::{Hmac, Mac as _};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::IntegrityError;

type HmacSha256 = Hmac<Sha256>;

/// The only integrity algorithm identifier this crate accepts.
pub const ALG: &str = "HMAC-SHA256";

fn b64url_no_pad(bytes: &[u8]) -> String {
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Compute `base64url_no_pad(HMAC-SHA256(key, payload))`.
pub fn sign(payload: &[u8], key: &[u8]) -> String {
    // `Hmac::new_from_slice` only fails for key types with a fixed maximum
    // length; `Hmac<Sha256>` accepts any key length, so this never errors.
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(payload);
    b64url_no_pad(&mac.finalize().into_bytes())
}

/// Recompute the MAC over `payload` and compare it against `signature` in
/// constant time.
///
/// `alg` must equal [`ALG`]; any other value is rejected without touching the
/// key or payload.
pub fn verify(alg: &str, payload: &[u8], signature: &str, key: &[u8]) -> Result<(), IntegrityError> {
    if alg != ALG {
        return Err(IntegrityError::UnsupportedAlg(alg.to_string()));
    }
    let expected = sign(payload, key);
    if expected.as_bytes().ct_eq(signature.as_bytes()).into() {
        Ok(())
    } else {
        Err(IntegrityError::SignatureMismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_is_deterministic() {
        let a = sign(b"payload", b"key");
        let b = sign(b"payload", b"key");
        assert_eq!(a, b);
    }

    #[test]
    fn verify_round_trips() {
        let sig = sign(b"payload", b"key");
        assert!(verify(ALG, b"payload", &sig, b"key").is_ok());
    }

    #[test]
    fn verify_rejects_tampered_payload() {
        let sig = sign(b"payload", b"key");
        assert!(verify(ALG, b"tampered", &sig, b"key").is_err());
    }

    #[test]
    fn verify_rejects_wrong_key() {
        let sig = sign(b"payload", b"key");
        assert!(verify(ALG, b"payload", &sig, b"other-key").is_err());
    }

    #[test]
    fn verify_rejects_unsupported_alg() {
        let sig = sign(b"payload", b"key");
        let err = verify("HMAC-SHA512", b"payload", &sig, b"key").unwrap_err();
        assert!(matches!(err, IntegrityError::UnsupportedAlg(_)));
    }

    #[test]
    fn signature_has_no_padding() {
        let sig = sign(b"payload", b"key");
        assert!(!sig.contains('='));
    }
}
