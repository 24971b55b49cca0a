//! Command-line definitions.

use std::path::PathBuf;

use captionkit_core::captions::CaptionField;
use clap::{ArgAction, Parser, Subcommand};

/// Headless caption editor with WebVTT export
#[derive(Debug, Parser)]
#[command(name = "captionkit", version, about)]
pub struct Cli {
    /// Session file (defaults to the configured session file in the working directory)
    #[arg(long, short, global = true)]
    pub session: Option<PathBuf>,

    /// Directory holding settings.json and logs
    #[arg(long, global = true, env = "CAPTIONKIT_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a new session file
    New {
        /// Video the captions belong to
        #[arg(long)]
        video: Option<String>,
        /// Do not add the example captions
        #[arg(long)]
        no_seed: bool,
        /// Overwrite an existing session file
        #[arg(long)]
        force: bool,
    },
    /// Add a caption at the current playback time
    Add {
        /// Playback time (MM:SS.mmm or seconds)
        #[arg(long)]
        at: String,
        /// Caption text
        #[arg(long)]
        text: Option<String>,
    },
    /// Set one field of a caption
    Set {
        id: String,
        /// start, end or text
        field: CaptionField,
        /// New value; times accept MM:SS.mmm or seconds
        value: String,
    },
    /// Set start and end of a caption together
    Retime {
        id: String,
        start: String,
        end: String,
    },
    /// Delete a caption
    Delete { id: String },
    /// List captions in timeline order
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the caption shown at a playback time
    Active {
        /// Playback time (MM:SS.mmm or seconds)
        time: String,
    },
    /// Write the session as a WebVTT file
    Export {
        /// Output file, or - for stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Add captions from a WebVTT file
    Import {
        file: PathBuf,
        /// Replace all existing captions
        #[arg(long)]
        replace: bool,
    },
    /// Show or reset settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective settings as JSON
    Show,
    /// Delete the settings file
    Reset,
}

impl Cli {
    /// Resolves the configuration directory
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .map(|d| d.join("captionkit"))
                .unwrap_or_else(|| PathBuf::from(".captionkit"))
        })
    }
}
