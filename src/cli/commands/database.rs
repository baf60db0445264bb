use crate::db::mysql::ConnectConfig;
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;
use std::time::Duration;
use tracing::warn;

pub const ARG_MYSQL_HOST: &str = "mysql-host";
pub const ARG_MYSQL_USER: &str = "mysql-user";
pub const ARG_MYSQL_PASSWORD: &str = "mysql-password";
pub const ARG_MYSQL_DATABASE: &str = "mysql-database";
pub const ARG_MYSQL_PORT: &str = "mysql-port";
pub const ARG_DB_MAX_CONNECTIONS: &str = "db-max-connections";
pub const ARG_DB_TIMEOUT: &str = "db-timeout";

const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Database settings. Everything is optional at this level; incomplete
/// settings put the server in degraded mode instead of failing startup.
#[derive(Debug, Clone)]
pub struct Options {
    pub host: Option<String>,
    pub user: Option<String>,
    pub password: Option<SecretString>,
    pub database: Option<String>,
    /// `None` when the configured value is not a valid port.
    pub port: Option<u16>,
    pub max_connections: u32,
    pub timeout_seconds: u64,
}

impl Options {
    /// Parse database arguments from matches.
    ///
    /// # Errors
    /// Currently infallible; kept fallible like the other option groups.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let read = |id: &str| -> Option<String> {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
        };

        Ok(Self {
            host: read(ARG_MYSQL_HOST),
            user: read(ARG_MYSQL_USER),
            password: matches
                .get_one::<String>(ARG_MYSQL_PASSWORD)
                .map(|p| SecretString::from(p.clone())),
            database: read(ARG_MYSQL_DATABASE),
            port: matches
                .get_one::<String>(ARG_MYSQL_PORT)
                .map_or(Some(DEFAULT_MYSQL_PORT), |raw| parse_port(raw)),
            max_connections: matches
                .get_one::<u32>(ARG_DB_MAX_CONNECTIONS)
                .copied()
                .unwrap_or(5),
            timeout_seconds: matches.get_one::<u64>(ARG_DB_TIMEOUT).copied().unwrap_or(5),
        })
    }

    #[must_use]
    pub fn connect_config(&self) -> ConnectConfig {
        ConnectConfig::new()
            .with_host(self.host.clone())
            .with_user(self.user.clone())
            .with_password(self.password.clone())
            .with_database(self.database.clone())
            .with_port(self.port)
            .with_max_connections(self.max_connections)
            .with_timeout(Duration::from_secs(self.timeout_seconds))
    }
}

/// A bad port leaves the database unconfigured instead of failing startup.
fn parse_port(raw: &str) -> Option<u16> {
    match raw.trim().parse::<u16>() {
        Ok(port) if port != 0 => Some(port),
        _ => {
            warn!("Invalid MYSQLPORT value {raw:?}, expected a port number");
            None
        }
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_MYSQL_HOST)
                .long(ARG_MYSQL_HOST)
                .help("MySQL server host")
                .env("MYSQLHOST"),
        )
        .arg(
            Arg::new(ARG_MYSQL_USER)
                .long(ARG_MYSQL_USER)
                .help("MySQL user")
                .env("MYSQLUSER"),
        )
        .arg(
            Arg::new(ARG_MYSQL_PASSWORD)
                .long(ARG_MYSQL_PASSWORD)
                .help("MySQL password")
                .env("MYSQLPASSWORD")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_MYSQL_DATABASE)
                .long(ARG_MYSQL_DATABASE)
                .help("MySQL database name")
                .env("MYSQLDATABASE"),
        )
        .arg(
            Arg::new(ARG_MYSQL_PORT)
                .long(ARG_MYSQL_PORT)
                .help("MySQL server port")
                .env("MYSQLPORT")
                .default_value("3306"),
        )
        .arg(
            Arg::new(ARG_DB_MAX_CONNECTIONS)
                .long(ARG_DB_MAX_CONNECTIONS)
                .help("Maximum number of pooled database connections")
                .env("FRONTDESK_DB_MAX_CONNECTIONS")
                .default_value("5")
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new(ARG_DB_TIMEOUT)
                .long(ARG_DB_TIMEOUT)
                .help("Database connect and acquire timeout in seconds")
                .env("FRONTDESK_DB_TIMEOUT")
                .default_value("5")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}
