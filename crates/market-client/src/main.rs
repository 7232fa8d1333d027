//! Headless marketplace client
//!
//! Run with:
//! ```bash
//! cargo run -p market-client
//! ```
//!
//! Configuration is loaded from environment variables (and `.env`).

use market_common::{try_init_tracing, try_init_tracing_with_config, ClientConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            if let Err(e) = try_init_tracing() {
                eprintln!("Warning: Failed to initialize tracing: {e}");
            }
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        env = ?config.app.env,
        api = %config.api.base_url,
        realtime = %config.realtime.url,
        "Configuration loaded"
    );

    if let Err(e) = run(config).await {
        error!(error = %e, "Client stopped with an error");
        std::process::exit(1);
    }
}

async fn run(config: ClientConfig) -> anyhow::Result<()> {
    market_client::app::run(config).await?;
    Ok(())
}
