//! Federation envelope shapes — data only, no authorization logic.
//!
//! Invitation and relationship-certificate exchange between resource servers
//! is explicitly out of scope for this core (see §1/§10.1 of the design
//! notes): the structures below pin the *shape* an outer federation layer
//! exchanges so that this crate's [`crate::capability::Token`] has a stable
//! neighbor to embed, but neither construction, signing, nor verification of
//! these envelopes is implemented here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A capability offered inside a federation invite: coarser-grained than a
/// [`crate::capability::token::Permission`], since it is negotiated between
/// two resource servers before either has minted a token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederatedCapability {
    #[serde(rename = "with")]
    pub with_resource: String,
    pub can: String,
}

/// A signed invitation to federate, exchanged out-of-band.
///
/// `signature` is opaque to this crate: verifying it requires whatever
/// asymmetric scheme the federation layer has agreed to use, which this core
/// does not implement (see [`crate::transit`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederationInvite {
    pub invitation_id: String,
    pub issuer_public_key: String,
    pub endpoint_hints: Vec<String>,
    pub capabilities: Vec<FederatedCapability>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub nonce: String,
    pub signature: Option<String>,
}

/// A responder's proof of having received a [`FederationInvite`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteAcceptance {
    pub invitation_id: String,
    pub responder_public_key: String,
    pub challenge_response: String,
    pub timestamp: DateTime<Utc>,
    pub signature: Option<String>,
}

/// A long-lived mutual capability record between two federated parties.
///
/// This is the federation-layer analogue of a [`crate::capability::Token`]
/// but is never produced, consumed, or validated by this crate — an outer
/// layer is responsible for translating between the two.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipCertificate {
    pub certificate_id: String,
    pub issuer_public_key: String,
    pub subject_public_key: String,
    pub capabilities: Vec<FederatedCapability>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub signature: Option<String>,
}

/// Produces `signature` for a [`FederationInvite`] against whatever
/// asymmetric scheme the federation layer has chosen. Not implemented by
/// this core — see the module doc.
pub trait InviteSigner {
    type Error;

    fn sign_invite(&self, invite: &mut FederationInvite) -> Result<(), Self::Error>;
}

/// Verifies a [`FederationInvite`]'s `signature` against its declared
/// `issuer_public_key`. Not implemented by this core — see the module doc.
pub trait InviteVerifier {
    type Error;

    fn verify_invite(&self, invite: &FederationInvite) -> Result<bool, Self::Error>;
}
