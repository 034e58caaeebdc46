//! Capability tokens: issuance and attenuation.

pub mod delegation;
pub mod token;

pub use delegation::derive;
pub use token::Token;
