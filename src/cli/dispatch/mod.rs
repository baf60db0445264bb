//! Maps parsed arguments to the action the binary runs.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{ARG_PORT, database, session};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if an option group cannot be parsed.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(5000);

    let database_opts = database::Options::parse(matches)?;
    let session_opts = session::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        database: database_opts.connect_config(),
        secret_key: session_opts.secret_key,
        cookie_secure: session_opts.cookie_secure,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;

    #[test]
    fn server_action_without_database() {
        temp_env::with_vars(
            [
                ("PORT", Some("5050")),
                ("MYSQLHOST", None),
                ("MYSQLUSER", None),
                ("MYSQLDATABASE", None),
                ("MYSQLPORT", None),
                ("SECRET_KEY", None),
            ],
            || {
                let matches = commands::new().get_matches_from(vec!["frontdesk"]);
                let Ok(Action::Server(args)) = handler(&matches) else {
                    panic!("expected a server action");
                };
                assert_eq!(args.port, 5050);
                assert!(args.secret_key.is_none());
                assert_eq!(args.database.missing().len(), 3);
            },
        );
    }
}
