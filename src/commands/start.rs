use anyhow::Result;
use colored::Colorize;
use sheet_price::{config, init_tracing, server};
use std::path::Path;
use tracing::info;

/// Execute the start command
///
/// This will:
/// 1. Load configuration
/// 2. Initialize logging from the server settings
/// 3. Start the server (blocks until shutdown)
pub async fn execute(config_path: &Path) -> Result<()> {
    let cfg = config::load_config(config_path)?;

    init_tracing(&cfg.server.log_level, &cfg.server.log_format);

    println!("{}", "Starting sheet-price in foreground mode...".green());
    info!(config = %config_path.display(), "Starting sheet-price");

    server::start_server(cfg).await?;

    Ok(())
}
