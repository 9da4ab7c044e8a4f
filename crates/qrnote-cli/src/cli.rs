use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use qrnote_core::config::TransportMode;

#[derive(Parser)]
#[command(name = "qrnote")]
#[command(about = "Turn short notes into QR codes and read them back")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to the client config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a note and write its QR code as PNG
    #[command(alias = "new")]
    Create {
        /// Note text (read from stdin when omitted and piped)
        text: Vec<String>,
        /// Photo to attach (repeatable, reference mode only)
        #[arg(short, long = "photo", value_name = "PATH")]
        photos: Vec<PathBuf>,
        /// Directory to write the PNG into (current directory when omitted)
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,
        /// Override the configured transport mode
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Read a QR code from image files, treating each as a camera frame
    Scan {
        /// Image files, tried in order until one decodes
        #[arg(required = true, value_name = "IMAGE")]
        images: Vec<PathBuf>,
        /// Print the escaped HTML display form
        #[arg(long)]
        html: bool,
    },
    /// Decode text read from a QR code
    Decode {
        /// Raw scanned text
        raw: String,
        /// Print the escaped HTML display form
        #[arg(long)]
        html: bool,
    },
    /// Show or initialize the client configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ModeArg {
    Inline,
    Reference,
}

impl From<ModeArg> for TransportMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Inline => Self::Inline,
            ModeArg::Reference => Self::Reference,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration (file plus environment overrides)
    Show,
    /// Write a new config file
    Init {
        /// Transport mode
        #[arg(long, value_enum, default_value_t = ModeArg::Inline)]
        mode: ModeArg,
        /// Note backend base URL (reference mode)
        #[arg(long, value_name = "URL")]
        api_base_url: Option<String>,
        /// Relay endpoint (inline mode)
        #[arg(long, value_name = "URL")]
        relay_url: Option<String>,
        /// Replace an existing config file
        #[arg(long)]
        force: bool,
    },
}
