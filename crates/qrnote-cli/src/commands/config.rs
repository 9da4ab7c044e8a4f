use std::path::Path;

use qrnote_core::config::{ClientConfig, TransportMode};
use qrnote_core::util::normalize_text_option;

use crate::cli::ConfigCommands;
use crate::commands::common::load_client_config;
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, config_path: &Path) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show => run_config_show(config_path),
        ConfigCommands::Init {
            mode,
            api_base_url,
            relay_url,
            force,
        } => {
            let config = build_config(mode.into(), api_base_url, relay_url);
            run_config_init(&config, config_path, force)
        }
    }
}

fn run_config_show(config_path: &Path) -> Result<(), CliError> {
    let config = load_client_config(config_path, None)?;
    println!("# {}", config_path.display());
    println!("{}", serde_json::to_string_pretty(&config)?);
    if let Err(error) = config.validate() {
        eprintln!("Warning: {}", error.user_message());
    }
    Ok(())
}

pub fn build_config(
    mode: TransportMode,
    api_base_url: Option<String>,
    relay_url: Option<String>,
) -> ClientConfig {
    ClientConfig {
        mode,
        api_base_url: normalize_text_option(api_base_url),
        relay_url: normalize_text_option(relay_url),
        ..ClientConfig::default()
    }
}

pub fn run_config_init(
    config: &ClientConfig,
    config_path: &Path,
    force: bool,
) -> Result<(), CliError> {
    if config_path.exists() && !force {
        return Err(CliError::ConfigExists(config_path.to_path_buf()));
    }

    config.save_to_path(config_path)?;
    println!("{}", config_path.display());

    if let Err(error) = config.validate() {
        eprintln!("Config saved but incomplete: {}", error.user_message());
    }
    Ok(())
}
