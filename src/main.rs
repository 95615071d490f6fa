use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use node_console::config::loader::load_effective_config;
use node_console::lifecycle::{signals, startup, Shutdown};
use node_console::observability::logging;

#[derive(Parser)]
#[command(name = "node-console")]
#[command(about = "Dashboard API and wallet console for a Bitcoin node", long_about = None)]
struct Args {
    /// TOML configuration file. Environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Config comes first so logging honours its level
    let config = load_effective_config(args.config.as_deref())?;
    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        node_url = %config.node.url,
        rpc_timeout_secs = config.node.rpc_timeout_secs,
        funds_policy = ?config.wallet.funds_policy,
        "Configuration loaded"
    );

    let shutdown = Arc::new(Shutdown::new());
    signals::spawn_signal_handler(shutdown.clone());

    startup::run(config, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
