//! Session lifecycle management

mod manager;

pub use manager::{LoginOutcome, SessionManager};
