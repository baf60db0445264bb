use clap::{Arg, ArgAction, ArgMatches, Command, builder::BoolishValueParser};
use secrecy::SecretString;

pub const ARG_SECRET_KEY: &str = "secret-key";
pub const ARG_COOKIE_SECURE: &str = "cookie-secure";

#[derive(Debug, Clone)]
pub struct Options {
    pub secret_key: Option<SecretString>,
    pub cookie_secure: bool,
}

impl Options {
    /// Parse session cookie arguments from matches.
    ///
    /// # Errors
    /// Currently infallible; kept fallible like the other option groups.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        Ok(Self {
            secret_key: matches
                .get_one::<String>(ARG_SECRET_KEY)
                .filter(|v| !v.is_empty())
                .map(|v| SecretString::from(v.clone())),
            cookie_secure: matches.get_flag(ARG_COOKIE_SECURE),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SECRET_KEY)
                .long(ARG_SECRET_KEY)
                .help("Key used to sign the session cookie (random per process when unset)")
                .env("SECRET_KEY")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_COOKIE_SECURE)
                .long(ARG_COOKIE_SECURE)
                .help("Mark the session cookie Secure (HTTPS only)")
                .env("FRONTDESK_COOKIE_SECURE")
                .action(ArgAction::SetTrue)
                .value_parser(BoolishValueParser::new()),
        )
}
