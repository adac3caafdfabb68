//! Ad Service client CLI - fetches ads for one context key.

use adservice_client::{
    port_or_default, AdServiceClient, ClientConfig, Telemetry, TelemetryConfig, DEFAULT_CONTEXT_KEY,
    DEFAULT_HOST,
};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "adservice-client")]
#[command(about = "Requests ads from the Ad Service", long_about = None)]
struct Cli {
    /// Context key to get ads for
    #[arg(default_value = DEFAULT_CONTEXT_KEY)]
    context_key: String,

    /// Ad Service host
    #[arg(default_value = DEFAULT_HOST)]
    host: String,

    /// Ad Service port; invalid values fall back to 9555
    port: Option<String>,

    /// Per-call deadline in milliseconds (unbounded when omitted)
    #[arg(long)]
    timeout_ms: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let port = port_or_default(cli.port.as_deref());

    let telemetry = Arc::new(Telemetry::from_config(&TelemetryConfig::from_env()));

    let mut config = ClientConfig::new(cli.host, port);
    if let Some(ms) = cli.timeout_ms {
        config = config.with_call_timeout(std::time::Duration::from_millis(ms));
    }

    let client = AdServiceClient::from_config(&config, telemetry)?;
    let result = client.get_ads(&cli.context_key);
    client.shutdown();
    result?;

    tracing::info!("Exiting AdServiceClient...");
    Ok(())
}
