use std::env;
use std::path::{Path, PathBuf};
use std::time::Instant;

use qrnote_core::config::TransportMode;
use qrnote_core::photos::{load_photos, preview_paths};
use qrnote_core::pipeline::{CapturePipeline, CaptureResult};
use qrnote_core::render::QrCodeRenderer;
use qrnote_core::transport::ConfiguredTransport;
use qrnote_core::ui::AppView;
use qrnote_core::NoteDraft;
use serde::Serialize;

use crate::commands::common::{load_client_config, resolve_note_text};
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct CreateOutput {
    pub note_id: String,
    pub mode: TransportMode,
    pub qr_content: String,
    pub path: PathBuf,
}

pub async fn run_create(
    text_parts: &[String],
    photo_paths: &[PathBuf],
    out_dir: Option<&Path>,
    mode: Option<TransportMode>,
    as_json: bool,
    config_path: &Path,
) -> Result<(), CliError> {
    let config = load_client_config(config_path, mode)?;
    let text = resolve_note_text(text_parts)?;

    let mut view = AppView::new(config.notice_timeout());
    view.draft_text = text.trim().to_string();
    view.draft_photos = photo_paths
        .iter()
        .map(|path| path.display().to_string())
        .collect();

    let counter = view.counter(config.max_text_chars);
    if counter.warning {
        eprintln!("Long note: {}", counter.label);
    }
    for path in preview_paths(photo_paths) {
        eprintln!("Attaching {}", path.display());
    }

    let photos = load_photos(photo_paths).await?;
    let draft = NoteDraft::new(text).with_photos(photos);

    let transport = ConfiguredTransport::from_config(&config)?;
    let pipeline = CapturePipeline::new(transport, QrCodeRenderer::new(config.qr_size));
    view.begin_submission();
    let outcome = pipeline.capture(&draft).await;
    view.submission_finished(&outcome, Instant::now());
    let result = outcome?;

    let out_dir = match out_dir {
        Some(dir) => dir.to_path_buf(),
        None => env::current_dir()?,
    };
    let path = write_artifact(&out_dir, &result)?;

    if as_json {
        let output = CreateOutput {
            note_id: result.note_id.to_string(),
            mode: result.target.mode(),
            qr_content: result.target.as_str().to_string(),
            path,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", path.display());
        println!("{}", result.note_id);
    }
    Ok(())
}

pub fn write_artifact(out_dir: &Path, result: &CaptureResult) -> Result<PathBuf, CliError> {
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(&result.artifact_name);
    std::fs::write(&path, &result.image.png)?;
    Ok(path)
}
