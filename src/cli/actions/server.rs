use crate::{
    api::{self, session::SessionConfig},
    credentials,
    db::mysql::{self, ConnectConfig},
};
use anyhow::Result;
use secrecy::SecretString;
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub database: ConnectConfig,
    pub secret_key: Option<SecretString>,
    pub cookie_secure: bool,
}

/// Execute the server action.
///
/// The database is optional: when it is not configured or not reachable the
/// server still starts and reports "database unavailable" on data routes.
///
/// # Errors
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let session = Arc::new(
        SessionConfig::from_secret(args.secret_key.as_ref()).with_secure(args.cookie_secure),
    );

    tokio::task::spawn_blocking(credentials::prepare).await?;

    let database = mysql::connect(&args.database).await;

    api::new(args.port, database, session).await
}

fn log_startup_args(args: &Args) {
    let missing = args.database.missing();
    let entries = [
        ("listen", format!("0.0.0.0:{}", args.port)),
        (
            "database",
            if missing.is_empty() {
                "configured".to_string()
            } else {
                format!("missing or invalid {}", missing.join(", "))
            },
        ),
        ("secret_key_set", args.secret_key.is_some().to_string()),
        ("cookie_secure", args.cookie_secure.to_string()),
    ];

    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!(
        "{} {} - {}\n\nStartup configuration:",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_commit(crate::GIT_COMMIT_HASH)
    );
    for (key, value) in &entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn short_commit(hash: &str) -> &str {
    let trimmed = hash.trim();
    trimmed.get(..7).unwrap_or(trimmed)
}
