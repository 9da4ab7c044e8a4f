use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use qrnote_core::codec::{Decoded, ScanResult};
use qrnote_core::config::{ClientConfig, TransportMode};
use qrnote_core::transport::ScanOutcome;

use crate::error::CliError;

const CONFIG_PATH_ENV: &str = "QRNOTE_CONFIG";

/// Note text from arguments, falling back to piped stdin.
///
/// An empty result is allowed here; photo-only notes are valid and the
/// validator decides.
pub fn resolve_note_text(text_parts: &[String]) -> Result<String, CliError> {
    let joined = text_parts.join(" ");
    if !joined.trim().is_empty() {
        return Ok(joined);
    }

    Ok(read_piped_stdin()?.unwrap_or_default())
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    if buffer.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(buffer))
    }
}

pub fn resolve_config_path(cli_config_path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    match cli_config_path.or_else(|| env::var_os(CONFIG_PATH_ENV).map(PathBuf::from)) {
        Some(path) => Ok(path),
        None => default_config_path(),
    }
}

pub fn default_config_path() -> Result<PathBuf, CliError> {
    dirs::config_dir()
        .map(|dir| dir.join("qrnote").join("config.json"))
        .ok_or_else(|| CliError::Config("Failed to resolve config directory".to_string()))
}

/// Load the config file, apply `QRNOTE_*` overrides, then the `--mode` flag.
pub fn load_client_config(
    path: &Path,
    mode: Option<TransportMode>,
) -> Result<ClientConfig, CliError> {
    load_client_config_with(path, mode, |name| env::var(name).ok())
}

pub fn load_client_config_with(
    path: &Path,
    mode: Option<TransportMode>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::load_from_path(path)?.with_overrides(lookup)?;
    if let Some(mode) = mode {
        config.mode = mode;
    }
    tracing::debug!(path = %path.display(), mode = %config.mode, "Loaded client config");
    Ok(config)
}

pub fn format_scan(scan: &ScanResult, html: bool) -> String {
    if html {
        return scan.display_html();
    }

    match &scan.content {
        Decoded::Structured(note) => match &note.id {
            Some(id) => format!("Note {id}\n\n{}", note.text),
            None => note.text.clone(),
        },
        Decoded::RawText(raw) => raw.clone(),
    }
}

pub fn format_outcome(outcome: &ScanOutcome, html: bool) -> String {
    match outcome {
        ScanOutcome::Local(scan) => format_scan(scan, html),
        ScanOutcome::Resolved { document, .. } => document.clone(),
    }
}
