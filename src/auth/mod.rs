//! Authentication flows.
//!
//! `AuthService` orchestrates the collaborators: user persistence,
//! one-time-password issuance, token signing, and outbound notification.
//! It holds no mutable state of its own; every flow is a pure composition
//! of its collaborators.

mod error;
mod service;

pub use error::AuthError;
pub use service::{AuthService, TokenPair, VerifiedSession};
