pub mod database;
pub mod logging;
pub mod session;

use clap::{
    Arg, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

pub const ARG_PORT: &str = "port";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("frontdesk")
        .about("User registration, login and contact form service")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("5000")
                .env("PORT")
                .value_parser(clap::value_parser!(u16)),
        );

    let command = session::with_args(command);
    let command = database::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    const CLEAN_ENV: [(&str, Option<&str>); 12] = [
        ("PORT", None),
        ("SECRET_KEY", None),
        ("FRONTDESK_COOKIE_SECURE", None),
        ("MYSQLHOST", None),
        ("MYSQLUSER", None),
        ("MYSQLPASSWORD", None),
        ("MYSQLDATABASE", None),
        ("MYSQLPORT", None),
        ("FRONTDESK_DB_MAX_CONNECTIONS", None),
        ("FRONTDESK_DB_TIMEOUT", None),
        ("FRONTDESK_LOG_LEVEL", None),
        ("RUST_LOG", None),
    ];

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "frontdesk");
        assert_eq!(
            command.get_about().unwrap().to_string(),
            "User registration, login and contact form service"
        );
        assert_eq!(
            command.get_version().unwrap().to_string(),
            env!("CARGO_PKG_VERSION")
        );
    }

    #[test]
    fn test_defaults() {
        temp_env::with_vars(CLEAN_ENV, || {
            let matches = new().get_matches_from(vec!["frontdesk"]);

            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(5000));
            assert_eq!(
                matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                Some(0)
            );

            let db = database::Options::parse(&matches).unwrap();
            assert_eq!(db.host, None);
            assert_eq!(db.port, Some(3306));
            assert_eq!(db.max_connections, 5);
            assert_eq!(db.timeout_seconds, 5);
            assert_eq!(
                db.connect_config().missing(),
                vec!["MYSQLHOST", "MYSQLUSER", "MYSQLDATABASE"]
            );

            let session = session::Options::parse(&matches).unwrap();
            assert!(session.secret_key.is_none());
            assert!(!session.cookie_secure);
        });
    }

    #[test]
    fn test_check_args() {
        temp_env::with_vars(CLEAN_ENV, || {
            let matches = new().get_matches_from(vec![
                "frontdesk",
                "--port",
                "8080",
                "--secret-key",
                "0123456789abcdef0123456789abcdef",
                "--cookie-secure",
                "--mysql-host",
                "db.internal",
                "--mysql-user",
                "app",
                "--mysql-password",
                "hunter2",
                "--mysql-database",
                "frontdesk",
                "--mysql-port",
                "3307",
                "--db-max-connections",
                "10",
                "--db-timeout",
                "2",
                "-vv",
            ]);

            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(8080));
            assert_eq!(
                matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                Some(2)
            );

            let db = database::Options::parse(&matches).unwrap();
            assert_eq!(db.host.as_deref(), Some("db.internal"));
            assert_eq!(db.user.as_deref(), Some("app"));
            assert_eq!(
                db.password.as_ref().map(|p| p.expose_secret().to_string()),
                Some("hunter2".to_string())
            );
            assert_eq!(db.database.as_deref(), Some("frontdesk"));
            assert_eq!(db.port, Some(3307));
            assert_eq!(db.max_connections, 10);
            assert_eq!(db.timeout_seconds, 2);
            assert!(db.connect_config().missing().is_empty());

            let session = session::Options::parse(&matches).unwrap();
            assert!(session.secret_key.is_some());
            assert!(session.cookie_secure);
        });
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("PORT", Some("443")),
                ("SECRET_KEY", Some("from-env-from-env-from-env-from-env")),
                ("FRONTDESK_COOKIE_SECURE", Some("true")),
                ("MYSQLHOST", Some("mysql.railway.internal")),
                ("MYSQLUSER", Some("root")),
                ("MYSQLPASSWORD", Some("pw")),
                ("MYSQLDATABASE", Some("railway")),
                ("MYSQLPORT", Some("3306")),
                ("FRONTDESK_DB_MAX_CONNECTIONS", None),
                ("FRONTDESK_DB_TIMEOUT", None),
                ("FRONTDESK_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["frontdesk"]);
                assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(443));
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );

                let db = database::Options::parse(&matches).unwrap();
                assert_eq!(db.host.as_deref(), Some("mysql.railway.internal"));
                assert_eq!(db.database.as_deref(), Some("railway"));

                let session = session::Options::parse(&matches).unwrap();
                assert_eq!(
                    session
                        .secret_key
                        .as_ref()
                        .map(|k| k.expose_secret().to_string()),
                    Some("from-env-from-env-from-env-from-env".to_string())
                );
                assert!(session.cookie_secure);
            },
        );
    }

    #[test]
    fn test_blank_database_env_is_missing() {
        temp_env::with_vars(
            [
                ("MYSQLHOST", Some("   ")),
                ("MYSQLUSER", Some("")),
                ("MYSQLDATABASE", Some("frontdesk")),
            ],
            || {
                let matches = new().get_matches_from(vec!["frontdesk"]);
                let db = database::Options::parse(&matches).unwrap();
                assert_eq!(
                    db.connect_config().missing(),
                    vec!["MYSQLHOST", "MYSQLUSER"]
                );
            },
        );
    }

    #[test]
    fn test_invalid_mysql_port_env_degrades() {
        for port in ["", "abc", "70000"] {
            temp_env::with_vars(
                [
                    ("MYSQLHOST", Some("db.internal")),
                    ("MYSQLUSER", Some("app")),
                    ("MYSQLDATABASE", Some("frontdesk")),
                    ("MYSQLPORT", Some(port)),
                ],
                || {
                    let matches = new().try_get_matches_from(vec!["frontdesk"]);
                    assert!(matches.is_ok(), "MYSQLPORT={port:?} must not abort startup");

                    let db = database::Options::parse(&matches.unwrap()).unwrap();
                    assert_eq!(db.port, None);
                    assert_eq!(db.connect_config().missing(), vec!["MYSQLPORT"]);
                },
            );
        }
    }

    #[test]
    fn test_check_log_level_env() {
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("FRONTDESK_LOG_LEVEL", Some(level))], || {
                let matches = new().get_matches_from(vec!["frontdesk"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(u8::try_from(index).unwrap())
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5 {
            temp_env::with_vars([("FRONTDESK_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["frontdesk".to_string()];
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(u8::try_from(index).unwrap())
                );
            });
        }
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        temp_env::with_vars(CLEAN_ENV, || {
            let result = new().try_get_matches_from(vec!["frontdesk", "--port", "http"]);
            assert!(result.is_err());
        });
    }
}
