//! MySQL backed [`Store`].

use super::{Database, Store, StoreError, User};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use sqlx::{
    Connection, MySqlPool,
    mysql::{MySqlConnectOptions, MySqlPoolOptions},
};
use std::time::Duration;
use tracing::{Instrument, error, info, info_span, warn};

/// Connection settings, usually sourced from `MYSQL*` environment variables.
#[derive(Clone)]
pub struct ConnectConfig {
    host: Option<String>,
    user: Option<String>,
    password: Option<SecretString>,
    database: Option<String>,
    port: Option<u16>,
    max_connections: u32,
    timeout: Duration,
}

impl ConnectConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            host: None,
            user: None,
            password: None,
            database: None,
            port: Some(3306),
            max_connections: 5,
            timeout: Duration::from_secs(5),
        }
    }

    #[must_use]
    pub fn with_host(mut self, host: Option<String>) -> Self {
        self.host = host;
        self
    }

    #[must_use]
    pub fn with_user(mut self, user: Option<String>) -> Self {
        self.user = user;
        self
    }

    #[must_use]
    pub fn with_password(mut self, password: Option<SecretString>) -> Self {
        self.password = password;
        self
    }

    #[must_use]
    pub fn with_database(mut self, database: Option<String>) -> Self {
        self.database = database;
        self
    }

    /// `None` marks a port value that could not be parsed.
    #[must_use]
    pub const fn with_port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub const fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Names of the settings that must be present and valid before a
    /// connection is tried.
    #[must_use]
    pub fn missing(&self) -> Vec<&'static str> {
        let blank = |value: &Option<String>| value.as_deref().map_or(true, |v| v.trim().is_empty());

        let mut missing = Vec::new();
        if blank(&self.host) {
            missing.push("MYSQLHOST");
        }
        if blank(&self.user) {
            missing.push("MYSQLUSER");
        }
        if blank(&self.database) {
            missing.push("MYSQLDATABASE");
        }
        if self.port.is_none() {
            missing.push("MYSQLPORT");
        }
        missing
    }

    fn connect_options(&self) -> MySqlConnectOptions {
        let mut options = MySqlConnectOptions::new();
        if let Some(port) = self.port {
            options = options.port(port);
        }
        if let Some(host) = &self.host {
            options = options.host(host);
        }
        if let Some(user) = &self.user {
            options = options.username(user);
        }
        if let Some(password) = &self.password {
            options = options.password(password.expose_secret());
        }
        if let Some(database) = &self.database {
            options = options.database(database);
        }
        options
    }
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .field("port", &self.port)
            .field("max_connections", &self.max_connections)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Try to open the pool; any failure leaves the process in degraded mode.
pub async fn connect(config: &ConnectConfig) -> Database {
    let missing = config.missing();
    if !missing.is_empty() {
        error!(
            "Database not configured, missing or invalid: {}; serving without a database",
            missing.join(", ")
        );
        return Database::Unavailable;
    }

    let pool = MySqlPoolOptions::new()
        .min_connections(1)
        .max_connections(config.max_connections)
        .acquire_timeout(config.timeout)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect_with(config.connect_options());

    match tokio::time::timeout(config.timeout, pool).await {
        Ok(Ok(pool)) => {
            info!("Database connected");
            Database::new(MySqlStore::new(pool))
        }
        Ok(Err(e)) => {
            error!("Error connecting to database: {e}");
            Database::Unavailable
        }
        Err(_) => {
            warn!(
                "Timed out connecting to database after {}s",
                config.timeout.as_secs()
            );
            Database::Unavailable
        }
    }
}

#[derive(Debug, Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    #[must_use]
    pub const fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for MySqlStore {
    async fn insert_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        let span = info_span!("db.query", db.system = "mysql", db.operation = "INSERT", db.table = "users");
        sqlx::query("INSERT INTO users (username, email, password) VALUES (?, ?, ?)")
            .bind(username)
            .bind(email)
            .bind(password_hash)
            .execute(&self.pool)
            .instrument(span)
            .await
            .map(|_| ())
            .map_err(StoreError::from_sqlx)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let span = info_span!("db.query", db.system = "mysql", db.operation = "SELECT", db.table = "users");
        sqlx::query_as::<_, User>(
            "SELECT username, email, password FROM users WHERE email = ? LIMIT 1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .instrument(span)
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn insert_contact_message(
        &self,
        name: &str,
        email: &str,
        message: &str,
    ) -> Result<(), StoreError> {
        let span = info_span!(
            "db.query",
            db.system = "mysql",
            db.operation = "INSERT",
            db.table = "contact_messages"
        );
        sqlx::query("INSERT INTO contact_messages (name, email, message) VALUES (?, ?, ?)")
            .bind(name)
            .bind(email)
            .bind(message)
            .execute(&self.pool)
            .instrument(span)
            .await
            .map(|_| ())
            .map_err(StoreError::from_sqlx)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let acquire_span = info_span!("db.acquire", db.system = "mysql", db.operation = "ACQUIRE");
        let mut conn = self
            .pool
            .acquire()
            .instrument(acquire_span)
            .await
            .map_err(StoreError::from_sqlx)?;

        let ping_span = info_span!("db.ping", db.system = "mysql", db.operation = "PING");
        conn.ping()
            .instrument(ping_span)
            .await
            .map_err(StoreError::from_sqlx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_reports_required_settings() {
        let config = ConnectConfig::new();
        assert_eq!(
            config.missing(),
            vec!["MYSQLHOST", "MYSQLUSER", "MYSQLDATABASE"]
        );

        let config = ConnectConfig::new()
            .with_host(Some("db.internal".to_string()))
            .with_user(Some(" ".to_string()))
            .with_database(Some("frontdesk".to_string()));
        assert_eq!(config.missing(), vec!["MYSQLUSER"]);
    }

    #[test]
    fn invalid_port_is_reported() {
        let config = ConnectConfig::new()
            .with_host(Some("db.internal".to_string()))
            .with_user(Some("app".to_string()))
            .with_database(Some("frontdesk".to_string()))
            .with_port(None);
        assert_eq!(config.missing(), vec!["MYSQLPORT"]);
    }

    #[tokio::test]
    async fn connect_with_invalid_port_is_unavailable() {
        let config = ConnectConfig::new()
            .with_host(Some("db.internal".to_string()))
            .with_user(Some("app".to_string()))
            .with_database(Some("frontdesk".to_string()))
            .with_port(None);
        assert!(!connect(&config).await.is_available());
    }

    #[test]
    fn password_is_optional() {
        let config = ConnectConfig::new()
            .with_host(Some("db.internal".to_string()))
            .with_user(Some("app".to_string()))
            .with_database(Some("frontdesk".to_string()));
        assert!(config.missing().is_empty());
    }

    #[test]
    fn debug_redacts_password() {
        let config = ConnectConfig::new().with_password(Some(SecretString::from("hunter2")));
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("***"));
    }

    #[tokio::test]
    async fn connect_without_configuration_is_unavailable() {
        let db = connect(&ConnectConfig::new()).await;
        assert!(!db.is_available());
    }
}
