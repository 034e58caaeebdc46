//! Capability-based authorization: token issuance, attenuation, revocation,
//! single-use tickets, and an ordered request validator.
//!
//! This crate implements the macaroon/UCAN-style core described in the
//! design notes: a trusted issuer mints short-lived tokens binding a
//! permission set to an audience and a holder key fingerprint
//! ([`capability::Token::issue`]); any holder may narrow one
//! ([`capability::derive`]); and a resource server reaches an allow/deny
//! [`validator::Decision`] by calling [`validator::validate_request`].
//!
//! Integrity is a shared-secret HMAC, not asymmetric signing — the signing
//! key is a secret held by the issuer and every resource server that
//! validates its tokens. Federation between trust domains and transport
//! encryption are explicitly out of scope; see [`federation`] and
//! [`transit`] for the boundaries this core pins without implementing.

pub mod canonical;
pub mod capability;
pub mod caveats;
pub mod context;
pub mod errors;
pub mod federation;
mod ids;
pub mod revocation;
pub mod ticket;
pub mod transit;
pub mod validator;

pub use capability::{derive, Token};
pub use caveats::{custom, ip_allowlist, nonce_matches, time_window, Caveat, CaveatOutcome};
pub use context::{Proof, RequestContext};
pub use revocation::{Revocable, RevocationIndex};
pub use ticket::{Ticket, TicketStore};
pub use validator::{validate_request, Decision, ProofVerifier};
