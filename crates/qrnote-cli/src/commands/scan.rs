use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use qrnote_core::codec::ScanResult;
use qrnote_core::config::{ClientConfig, Facing, ScannerConfig, TransportMode};
use qrnote_core::scanner::{Camera, Frame, FrameStream, RqrrDecoder, Scanner};
use qrnote_core::transport::{ConfiguredTransport, NoteTransport, ScanOutcome};
use qrnote_core::ui::AppView;

use crate::commands::common::{format_outcome, load_client_config};
use crate::error::CliError;

/// Camera whose frames are image files.
#[derive(Debug, Clone)]
pub struct FileCamera {
    paths: Vec<PathBuf>,
}

impl FileCamera {
    pub const fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

pub struct FileFrames {
    pending: VecDeque<PathBuf>,
}

impl Camera for FileCamera {
    type Stream = FileFrames;

    async fn acquire(&mut self, _facing: Facing) -> qrnote_core::Result<FileFrames> {
        Ok(FileFrames {
            pending: self.paths.iter().cloned().collect(),
        })
    }
}

impl FrameStream for FileFrames {
    async fn next_frame(&mut self) -> Option<Frame> {
        while let Some(path) = self.pending.pop_front() {
            let frame = match tokio::fs::read(&path).await {
                Ok(bytes) => Frame::from_encoded(&bytes),
                Err(error) => Err(error.into()),
            };
            match frame {
                Ok(frame) => return Some(frame),
                Err(error) => tracing::warn!(path = %path.display(), %error, "Skipping image"),
            }
        }
        None
    }

    fn release(&mut self) -> qrnote_core::Result<()> {
        self.pending.clear();
        Ok(())
    }
}

pub async fn run_scan(images: &[PathBuf], html: bool, config_path: &Path) -> Result<(), CliError> {
    let config = load_client_config(config_path, None)?;
    let cancel = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let mut view = AppView::new(config.notice_timeout());
    view.open_scanner();
    let scanned = scan_images(images, &config.scanner, cancel).await;
    view.close_scanner();

    let Some(raw) = scanned? else {
        return Ok(());
    };
    eprintln!("{}", view.scanner_success_line(&raw));
    let outcome = resolve(&config, &raw).await?;
    println!("{}", format_outcome(&outcome, html));
    Ok(())
}

/// Feed image files through the scanner; the first decodable one wins.
pub async fn scan_images<F>(
    images: &[PathBuf],
    scanner_config: &ScannerConfig,
    cancel: F,
) -> Result<Option<String>, CliError>
where
    F: std::future::Future<Output = ()>,
{
    // Still images are searched whole rather than through the live-camera window.
    let config = ScannerConfig {
        window: None,
        ..*scanner_config
    };
    let mut scanner = Scanner::new(
        FileCamera::new(images.to_vec()),
        RqrrDecoder::from_config(&config),
        config,
    );

    scanner.open().await?;
    match scanner.scan(cancel).await {
        Ok(raw) => Ok(raw),
        Err(qrnote_core::Error::Capture(_)) => Err(CliError::NoQrCode),
        Err(error) => Err(error.into()),
    }
}

async fn resolve(config: &ClientConfig, raw: &str) -> Result<ScanOutcome, CliError> {
    match config.mode {
        TransportMode::Inline => Ok(ScanOutcome::Local(ScanResult::from_raw(raw))),
        TransportMode::Reference => {
            let transport = ConfiguredTransport::from_config(config)?;
            Ok(transport.resolve_scan(raw).await?)
        }
    }
}
