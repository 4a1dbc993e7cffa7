//! Auth endpoints: registration, sign-in, OTP verification, token refresh
//! and password flows.

mod guard;
pub mod me;
pub mod otp;
pub mod password;
pub mod signin;
pub mod state;
mod throttle;
pub mod tokens;
pub mod types;
mod utils;
