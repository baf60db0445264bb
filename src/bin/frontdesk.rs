use anyhow::Result;
use frontdesk::cli::{self, telemetry};

// Main function
#[tokio::main]
async fn main() -> Result<()> {
    // `.env` is optional; real environment variables take precedence
    let _ = dotenvy::dotenv();

    let action = cli::start()?;

    let result = action.execute().await;

    telemetry::shutdown_tracer();

    result
}
