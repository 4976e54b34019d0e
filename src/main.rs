use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; real environment variables win
    dotenv::dotenv().ok();

    let args = cli::Cli::parse();

    // Dispatch to appropriate command handler
    match args.get_command() {
        cli::Commands::Start => {
            commands::start::execute(&args.config).await?;
        }
        cli::Commands::Test => {
            commands::test::execute(&args.config)?;
        }
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&args.config)?,
        },
        cli::Commands::Lookup { model, admin } => {
            commands::lookup::execute(&args.config, &model, admin).await?;
        }
        cli::Commands::Version => {
            println!("sheet-price v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
