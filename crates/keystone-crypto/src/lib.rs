//! Cryptographic primitives shared by keystone's authorization core.
//!
//! This crate is deliberately narrow: it holds exactly the keyed-MAC and
//! content-hashing operations the authorization layer needs, not a general
//! crypto toolkit. Asymmetric signing, key derivation, and transport
//! encryption live outside this core (see the federation and transit
//! boundaries in `keystone-authz`).

pub mod digest;
pub mod error;
pub mod mac;

pub use digest::{sha256, sha256_hex};
pub use error::IntegrityError;
pub use mac::{sign, verify, ALG};
