//! Bearer token handling
//!
//! Tokens are decoded locally only to read their claims. Signature
//! verification is left to the backend.

mod claims;
mod decoder;
mod roles;

pub use claims::Claims;
pub use decoder::{decode, expiry_ms, is_well_formed};
pub use roles::{extract_roles, normalize_role, RoleSet};
