use anyhow::Result;
use quill_cms::config::HarnessSettings;
use quill_cms::Bootstrap;
use tracing::{info, instrument};

/// One-shot preparation of the integration-test database: reads the harness
/// configuration, runs the full setup sequence, and exits.
#[tokio::main]
#[instrument]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("Preparing Quill test environment");

    let settings = HarnessSettings::new()?;
    let bootstrap = Bootstrap::new(settings);
    bootstrap.setup_db().await?;

    info!("Test environment ready");

    Ok(())
}
