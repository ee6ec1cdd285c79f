//! Session domain - derived session state

mod snapshot;

pub use snapshot::{SessionSnapshot, SessionState, UnknownExpiryPolicy};
