//! Marketplace API server entry point
//!
//! ```bash
//! MARKET__JWT__SECRET=dev MARKET__DATABASE__BACKEND=memory cargo run -p market-api
//! ```

use market_common::{try_init_tracing, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "Server failed to start");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    if let Err(e) = try_init_tracing(&TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: failed to initialize tracing: {e}");
    }

    info!(
        env = ?config.app.env,
        address = %config.api.address(),
        backend = ?config.database.backend,
        storage = ?config.storage.backend,
        "Configuration loaded"
    );

    market_api::run(config).await?;
    Ok(())
}
