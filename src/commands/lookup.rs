use anyhow::Result;
use colored::Colorize;
use sheet_price::{config, init_tracing, quote, server::build_row_source};
use std::path::Path;

/// Execute the lookup command
///
/// Runs one lookup against the live sheet, exactly as the HTTP API would,
/// and prints the JSON answer.
pub async fn execute(config_path: &Path, model: &str, admin: bool) -> Result<()> {
    init_tracing("warn", "text");

    let cfg = config::load_config(config_path)?;
    let rows = build_row_source(&cfg, reqwest::Client::new());

    let output = if admin {
        quote::lookup_admin(rows.as_ref(), model)
            .await
            .map(|q| serde_json::to_string_pretty(&q))
    } else {
        quote::lookup(rows.as_ref(), model)
            .await
            .map(|q| serde_json::to_string_pretty(&q))
    };

    match output {
        Ok(json) => {
            println!("{}", json?);
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            Err(anyhow::anyhow!("lookup for '{}' failed", model))
        }
    }
}
