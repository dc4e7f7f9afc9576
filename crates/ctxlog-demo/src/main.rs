//! ctxlog demo: an HTTP service whose handlers log with request-scoped tags
//! instead of passing identifiers around.

mod config;
mod request_tags;
mod server;

use config::DemoConfig;
use server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Determine config path
    let config_path = {
        let args: Vec<String> = std::env::args().collect();
        // Check for --config flag first
        args.iter()
            .position(|a| a == "--config")
            .and_then(|i| args.get(i + 1).cloned())
            // Fall back to positional arg
            .or_else(|| args.get(1).filter(|a| !a.starts_with('-')).cloned())
            .or_else(|| std::env::var("CTXLOG_DEMO_CONFIG").ok())
            .unwrap_or_else(|| "ctxlog-demo.toml".to_string())
    };

    let config = DemoConfig::load(&config_path)?;

    ctxlog_tracing::init_tracing(&config.tracing)?;

    tracing::info!(
        config_path = %config_path,
        listen_address = %config.server.listen_address,
        tag_key = %config.tags.key,
        tag_header = %config.tags.header,
        "Starting ctxlog demo"
    );

    let state = AppState::new(config)?;
    server::run(state).await
}
