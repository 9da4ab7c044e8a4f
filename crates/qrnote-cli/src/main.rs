//! QR Notes CLI - create QR notes and read them back from the terminal.

mod cli;
mod commands;
mod error;

#[cfg(test)]
mod tests;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::common::resolve_config_path;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::create::run_create;
use crate::commands::decode::run_decode;
use crate::commands::scan::run_scan;
use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {}", error.user_message());
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("qrnote=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config)?;

    match cli.command {
        Commands::Create {
            text,
            photos,
            out,
            mode,
            json,
        } => {
            run_create(
                &text,
                &photos,
                out.as_deref(),
                mode.map(Into::into),
                json,
                &config_path,
            )
            .await?;
        }
        Commands::Scan { images, html } => run_scan(&images, html, &config_path).await?,
        Commands::Decode { raw, html } => run_decode(&raw, html),
        Commands::Config { command } => run_config(command, &config_path)?,
        Commands::Completions { shell, output } => {
            run_completions(shell, output.as_deref())?;
        }
    }

    Ok(())
}
