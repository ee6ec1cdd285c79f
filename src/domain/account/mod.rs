//! Account payloads exchanged with the auth backend

mod entity;

pub use entity::{Identity, LoginCredentials, PasswordChange, SignupProfile};
