use anyhow::Result;
use colored::Colorize;
use sheet_price::{
    config::{self, Config},
    init_tracing,
    logging::mask_secret,
};
use std::path::Path;
use tracing::info;

/// Execute the config show command
///
/// Displays the current configuration with secrets masked
pub fn show(config_path: &Path) -> Result<()> {
    init_tracing("warn", "text");

    println!("{}", "Loading configuration...".yellow());
    info!("Loading configuration for display");

    let cfg = config::load_config(config_path)?;
    let sanitized = sanitize_secrets(&cfg);

    println!("{}", "Current Configuration:".green().bold());
    println!();

    let toml_string = toml::to_string_pretty(&sanitized)?;
    println!("{}", toml_string);

    info!("Configuration displayed successfully");
    Ok(())
}

/// Sanitize secrets in configuration for safe display
fn sanitize_secrets(cfg: &Config) -> Config {
    let mut sanitized = cfg.clone();

    sanitized.auth.admin_password = mask_secret(cfg.auth.admin_password.as_deref());
    sanitized.auth.token_secret = mask_secret(cfg.auth.token_secret.as_deref());

    sanitized
}
