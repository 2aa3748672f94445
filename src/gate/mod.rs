//! Credential gate: token issuance, verification, identity re-resolution
//! and role checks. Each request walks the same pipeline — bearer token
//! extracted, signature and expiry verified, subject re-resolved against the
//! injected identity store, role checked against the route's allowed set —
//! and any failure short-circuits with its specific kind.

pub mod authz;
pub mod claims;
pub mod error;
pub mod extract;
pub mod keys;

pub use authz::{authenticate, authorize};
pub use claims::Claims;
pub use error::GateError;
pub use extract::CurrentIdentity;
pub use keys::TokenKeys;
