use std::collections::HashMap;
use std::time::Duration;

use clap::Parser;
use pretty_assertions::assert_eq;
use qrnote_core::codec::ScanResult;
use qrnote_core::config::{ClientConfig, ScannerConfig, TransportMode};
use qrnote_core::pipeline::CaptureResult;
use qrnote_core::render::{QrCodeRenderer, QrRenderer};
use qrnote_core::transport::{QrTarget, ScanOutcome};
use qrnote_core::NoteId;

use crate::cli::{Cli, Commands, CompletionShell, ConfigCommands, ModeArg};
use crate::commands::common::{format_outcome, format_scan, load_client_config_with};
use crate::commands::completions::render_completions;
use crate::commands::config::{build_config, run_config_init};
use crate::commands::create::write_artifact;
use crate::commands::scan::scan_images;
use crate::error::CliError;

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn create_collects_text_and_repeated_photos() {
    let cli = Cli::try_parse_from([
        "qrnote",
        "create",
        "spare",
        "keys",
        "--photo",
        "a.jpg",
        "-p",
        "b.jpg",
        "--mode",
        "reference",
    ])
    .unwrap();

    let Commands::Create {
        text, photos, mode, ..
    } = cli.command
    else {
        panic!("expected create command");
    };
    assert_eq!(text, vec!["spare", "keys"]);
    assert_eq!(photos.len(), 2);
    assert_eq!(mode, Some(ModeArg::Reference));
    assert_eq!(TransportMode::from(ModeArg::Reference), TransportMode::Reference);
}

#[test]
fn scan_requires_an_image() {
    assert!(Cli::try_parse_from(["qrnote", "scan"]).is_err());
}

#[test]
fn config_init_defaults_to_inline() {
    let cli = Cli::try_parse_from(["qrnote", "config", "init"]).unwrap();
    let Commands::Config {
        command: ConfigCommands::Init { mode, force, .. },
    } = cli.command
    else {
        panic!("expected config init");
    };
    assert_eq!(mode, ModeArg::Inline);
    assert!(!force);
}

#[test]
fn format_scan_shows_structured_note() {
    let scan = ScanResult::from_raw(r#"{"id":1700000000000,"text":"hello"}"#);
    assert_eq!(format_scan(&scan, false), "Note 1700000000000\n\nhello");

    let scan = ScanResult::from_raw(r#"{"text":"<i>hi</i>"}"#);
    assert_eq!(format_scan(&scan, false), "<i>hi</i>");
    assert_eq!(format_scan(&scan, true), "&lt;i&gt;hi&lt;/i&gt;");
}

#[test]
fn format_scan_keeps_opaque_text() {
    let scan = ScanResult::from_raw("not json at all");
    assert_eq!(format_scan(&scan, false), "not json at all");
}

#[test]
fn format_outcome_prints_backend_document() {
    let outcome = ScanOutcome::Resolved {
        raw: "qrapp:note:1".to_string(),
        document: "<h1>Note</h1>".to_string(),
    };
    assert_eq!(format_outcome(&outcome, false), "<h1>Note</h1>");
}

#[test]
fn mode_flag_overrides_file_and_env() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "mode": "reference" }"#).unwrap();

    let env = HashMap::from([("QRNOTE_RELAY_URL", "https://relay.example.com/v1/relay")]);
    let config = load_client_config_with(&path, Some(TransportMode::Inline), |name| {
        env.get(name).map(|value| (*value).to_string())
    })
    .unwrap();

    assert_eq!(config.mode, TransportMode::Inline);
    assert_eq!(
        config.relay_url.as_deref(),
        Some("https://relay.example.com/v1/relay")
    );
    assert!(config.validate().is_ok());
}

#[test]
fn missing_config_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_client_config_with(&dir.path().join("missing.json"), None, no_env).unwrap();
    assert_eq!(config, ClientConfig::default());
}

#[test]
fn config_init_refuses_to_overwrite_without_force() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("qrnote").join("config.json");
    let config = build_config(
        TransportMode::Reference,
        Some(" https://notes.example.com ".to_string()),
        None,
    );

    run_config_init(&config, &path, false).unwrap();
    let saved = ClientConfig::load_from_path(&path).unwrap();
    assert_eq!(saved.api_base_url.as_deref(), Some("https://notes.example.com"));

    let error = run_config_init(&config, &path, false).unwrap_err();
    assert!(matches!(error, CliError::ConfigExists(_)));
    assert!(run_config_init(&config, &path, true).is_ok());
}

#[test]
fn completions_name_the_binary() {
    let script = String::from_utf8(render_completions(CompletionShell::Bash)).unwrap();
    assert!(script.contains("qrnote"));
}

#[test]
fn write_artifact_uses_mode_specific_name() {
    let dir = tempfile::tempdir().unwrap();
    let image = QrCodeRenderer::default().render("https://notes.example.com/qr").unwrap();
    let result = CaptureResult {
        note_id: NoteId::Assigned("n-1".to_string()),
        target: QrTarget::Reference("https://notes.example.com/qr".to_string()),
        image,
        artifact_name: "note-n-1.png".to_string(),
    };

    let path = write_artifact(&dir.path().join("out"), &result).unwrap();
    assert_eq!(path, dir.path().join("out").join("note-n-1.png"));
    assert_eq!(std::fs::read(&path).unwrap(), result.image.png);
}

#[tokio::test]
async fn scan_images_skips_unreadable_files() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.png");
    std::fs::write(&broken, b"not an image").unwrap();
    let code = dir.path().join("code.png");
    let image = QrCodeRenderer::default()
        .render(r#"{"id":1,"text":"from file"}"#)
        .unwrap();
    std::fs::write(&code, &image.png).unwrap();

    let config = ScannerConfig {
        fps: 100,
        ..ScannerConfig::default()
    };
    let raw = scan_images(
        &[broken, dir.path().join("missing.png"), code],
        &config,
        std::future::pending(),
    )
    .await
    .unwrap();

    let raw = raw.unwrap();
    assert_eq!(ScanResult::from_raw(raw).text(), "from file");
}

#[tokio::test]
async fn scan_images_without_code_reports_no_qr() {
    let dir = tempfile::tempdir().unwrap();
    let blank = dir.path().join("blank.png");
    let image = QrCodeRenderer::default().render("x").unwrap();
    // A valid image that is not a QR code: flip every pixel to white.
    let mut decoded = image::load_from_memory(&image.png).unwrap().to_luma8();
    decoded.pixels_mut().for_each(|pixel| pixel.0[0] = 255);
    decoded.save(&blank).unwrap();

    let config = ScannerConfig {
        fps: 100,
        ..ScannerConfig::default()
    };
    let error = tokio::time::timeout(
        Duration::from_secs(5),
        scan_images(&[blank], &config, std::future::pending()),
    )
    .await
    .unwrap()
    .unwrap_err();
    assert!(matches!(error, CliError::NoQrCode));
}
