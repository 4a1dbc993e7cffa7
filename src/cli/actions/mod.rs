pub mod server;

use secrecy::SecretString;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        token_secret: SecretString,
        token_issuer: String,
        token_audience: String,
        access_token_ttl: i64,
        refresh_token_ttl: i64,
        otp_ttl: i64,
    },
}
