//! Access and refresh token issuance and verification.
//!
//! Tokens are HS256 JWTs over a shared secret. Claims carry the subject id
//! plus a small set of named optional fields (`email`, `role`) rather than
//! an open-ended map, so token contents stay auditable.

mod jwt;
mod signer;

pub use jwt::{Error, TokenClaims, sign_hs256, verify_hs256};
pub use signer::{
    DEFAULT_ACCESS_TOKEN_TTL_SECONDS, DEFAULT_REFRESH_TOKEN_TTL_SECONDS, TokenConfig, TokenSigner,
};
