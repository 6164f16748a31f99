//! CLI module for Frontline.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Frontline - documents in, war-correspondent dispatches out
///
/// Extracts the text of an image, PDF or DOCX file, rewrites it as a
/// war-reporter style report and narrates it.
#[derive(Parser, Debug)]
#[command(name = "frontline")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline: extract, report and narrate
    Narrate {
        /// Image, PDF or DOCX file
        file: String,

        /// OCR language code (e.g. eng, fra); defaults to ocr.language_default
        #[arg(short, long)]
        language: Option<String>,

        /// Where to write the narration (defaults to <output_dir>/<name>-<timestamp>.wav)
        #[arg(short, long)]
        output: Option<String>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract text only
    Extract {
        /// Image, PDF or DOCX file
        file: String,

        /// OCR language code
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Narrate text directly, skipping extraction and summarization
    Speak {
        /// Text to narrate, or '-' to read from stdin
        text: String,

        /// Where to write the narration
        #[arg(short, long, default_value = "narration.wav")]
        output: String,
    },

    /// Start HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
