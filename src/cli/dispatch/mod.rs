use crate::cli::actions::Action;
use crate::otp::DEFAULT_OTP_TTL_SECONDS;
use crate::token::{DEFAULT_ACCESS_TOKEN_TTL_SECONDS, DEFAULT_REFRESH_TOKEN_TTL_SECONDS};
use anyhow::Result;
use secrecy::SecretString;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    Ok(Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        token_secret: matches
            .get_one::<String>("token-secret")
            .map(|secret| SecretString::from(secret.clone()))
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --token-secret"))?,
        token_issuer: matches
            .get_one::<String>("token-issuer")
            .cloned()
            .unwrap_or_else(|| "kunci".to_string()),
        token_audience: matches
            .get_one::<String>("token-audience")
            .cloned()
            .unwrap_or_else(|| "kunci".to_string()),
        access_token_ttl: matches
            .get_one::<i64>("access-token-ttl")
            .copied()
            .unwrap_or(DEFAULT_ACCESS_TOKEN_TTL_SECONDS),
        refresh_token_ttl: matches
            .get_one::<i64>("refresh-token-ttl")
            .copied()
            .unwrap_or(DEFAULT_REFRESH_TOKEN_TTL_SECONDS),
        otp_ttl: matches
            .get_one::<i64>("otp-ttl")
            .copied()
            .unwrap_or(DEFAULT_OTP_TTL_SECONDS),
    })
}
