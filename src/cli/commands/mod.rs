use clap::{
    Arg, ColorChoice, Command,
    builder::{
        ValueParser,
        styling::{AnsiColor, Effects, Styles},
    },
};

use crate::otp::DEFAULT_OTP_TTL_SECONDS;
use crate::token::{DEFAULT_ACCESS_TOKEN_TTL_SECONDS, DEFAULT_REFRESH_TOKEN_TTL_SECONDS};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("kunci")
        .about("Authentication service")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("KUNCI_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("token-secret")
                .long("token-secret")
                .help("Shared secret used to sign access and refresh tokens")
                .env("KUNCI_TOKEN_SECRET")
                .required(true),
        )
        .arg(
            Arg::new("token-issuer")
                .long("token-issuer")
                .help("Issuer claim stamped into signed tokens")
                .default_value("kunci")
                .env("KUNCI_TOKEN_ISSUER"),
        )
        .arg(
            Arg::new("token-audience")
                .long("token-audience")
                .help("Audience claim stamped into signed tokens")
                .default_value("kunci")
                .env("KUNCI_TOKEN_AUDIENCE"),
        )
        .arg(
            Arg::new("access-token-ttl")
                .long("access-token-ttl")
                .help("Access token lifetime in seconds")
                .default_value(const_str(DEFAULT_ACCESS_TOKEN_TTL_SECONDS))
                .env("KUNCI_ACCESS_TOKEN_TTL")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("refresh-token-ttl")
                .long("refresh-token-ttl")
                .help("Refresh token lifetime in seconds")
                .default_value(const_str(DEFAULT_REFRESH_TOKEN_TTL_SECONDS))
                .env("KUNCI_REFRESH_TOKEN_TTL")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("otp-ttl")
                .long("otp-ttl")
                .help("One-time code lifetime in seconds")
                .default_value(const_str(DEFAULT_OTP_TTL_SECONDS))
                .env("KUNCI_OTP_TTL")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("KUNCI_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}

fn const_str(value: i64) -> clap::builder::OsStr {
    value.to_string().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "kunci");
        assert_eq!(
            command.get_about().unwrap().to_string(),
            "Authentication service"
        );
        assert_eq!(
            command.get_version().unwrap().to_string(),
            env!("CARGO_PKG_VERSION")
        );
    }

    #[test]
    fn test_check_flags() {
        let command = new();
        let matches = command.get_matches_from(vec![
            "kunci",
            "--port",
            "8443",
            "--token-secret",
            "sekrit",
            "--token-issuer",
            "https://auth.example.com",
            "--token-audience",
            "api.example.com",
            "--access-token-ttl",
            "120",
            "--refresh-token-ttl",
            "240",
            "--otp-ttl",
            "90",
        ]);

        assert_eq!(matches.get_one::<u16>("port").copied(), Some(8443));
        assert_eq!(
            matches.get_one::<String>("token-secret").cloned(),
            Some("sekrit".to_string())
        );
        assert_eq!(
            matches.get_one::<String>("token-issuer").cloned(),
            Some("https://auth.example.com".to_string())
        );
        assert_eq!(
            matches.get_one::<String>("token-audience").cloned(),
            Some("api.example.com".to_string())
        );
        assert_eq!(
            matches.get_one::<i64>("access-token-ttl").copied(),
            Some(120)
        );
        assert_eq!(
            matches.get_one::<i64>("refresh-token-ttl").copied(),
            Some(240)
        );
        assert_eq!(matches.get_one::<i64>("otp-ttl").copied(), Some(90));
    }

    #[test]
    fn test_check_defaults() {
        let matches = new().get_matches_from(vec!["kunci", "--token-secret", "sekrit"]);

        assert_eq!(matches.get_one::<u16>("port").copied(), Some(8080));
        assert_eq!(
            matches.get_one::<String>("token-issuer").cloned(),
            Some("kunci".to_string())
        );
        assert_eq!(
            matches.get_one::<String>("token-audience").cloned(),
            Some("kunci".to_string())
        );
        assert_eq!(
            matches.get_one::<i64>("access-token-ttl").copied(),
            Some(DEFAULT_ACCESS_TOKEN_TTL_SECONDS)
        );
        assert_eq!(
            matches.get_one::<i64>("refresh-token-ttl").copied(),
            Some(DEFAULT_REFRESH_TOKEN_TTL_SECONDS)
        );
        assert_eq!(
            matches.get_one::<i64>("otp-ttl").copied(),
            Some(DEFAULT_OTP_TTL_SECONDS)
        );
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("KUNCI_PORT", Some("443")),
                ("KUNCI_TOKEN_SECRET", Some("from-env")),
                ("KUNCI_TOKEN_ISSUER", Some("https://auth.kunci.dev")),
                ("KUNCI_TOKEN_AUDIENCE", Some("kunci-api")),
                ("KUNCI_ACCESS_TOKEN_TTL", Some("600")),
                ("KUNCI_REFRESH_TOKEN_TTL", Some("1200")),
                ("KUNCI_OTP_TTL", Some("30")),
                ("KUNCI_LOG_LEVEL", Some("info")),
            ],
            || {
                let command = new();
                let matches = command.get_matches_from(vec!["kunci"]);
                assert_eq!(matches.get_one::<u16>("port").copied(), Some(443));
                assert_eq!(
                    matches.get_one::<String>("token-secret").cloned(),
                    Some("from-env".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>("token-issuer").cloned(),
                    Some("https://auth.kunci.dev".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>("token-audience").cloned(),
                    Some("kunci-api".to_string())
                );
                assert_eq!(
                    matches.get_one::<i64>("access-token-ttl").copied(),
                    Some(600)
                );
                assert_eq!(
                    matches.get_one::<i64>("refresh-token-ttl").copied(),
                    Some(1200)
                );
                assert_eq!(matches.get_one::<i64>("otp-ttl").copied(), Some(30));
                assert_eq!(matches.get_one::<u8>("verbosity").copied(), Some(2));
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars(
                [
                    ("KUNCI_LOG_LEVEL", Some(level)),
                    ("KUNCI_TOKEN_SECRET", Some("sekrit")),
                ],
                || {
                    let command = new();
                    let matches = command.get_matches_from(vec!["kunci"]);
                    assert_eq!(
                        matches.get_one::<u8>("verbosity").copied(),
                        Some(index as u8)
                    );
                },
            );
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        // loop cover all possible value_parse
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, _) in levels.iter().enumerate() {
            temp_env::with_vars([("KUNCI_LOG_LEVEL", None::<String>)], || {
                let mut args = vec![
                    "kunci".to_string(),
                    "--token-secret".to_string(),
                    "sekrit".to_string(),
                ];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    let v = format!("-{}", "v".repeat(index));
                    args.push(v);
                }

                let command = new();

                let matches = command.get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>("verbosity").copied(),
                    Some(index as u8)
                );
            });
        }
    }
}
