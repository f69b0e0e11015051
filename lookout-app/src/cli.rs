use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lookout_common::OutputFormat;

/// Page perception for browser agents: numbered element maps, overlay
/// suppression and content summaries.
#[derive(Parser, Debug)]
#[command(name = "lookout")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "lookout.yaml", global = true, env = "LOOKOUT_CONFIG")]
    pub config: PathBuf,

    /// Output format (json, yaml, text)
    #[arg(short, long, default_value = "json", global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Open a page, suppress overlays and list its interactive elements
    Scan {
        url: String,

        /// Save a screenshot with the numbered markers drawn
        #[arg(long)]
        screenshot: Option<PathBuf>,

        /// Skip overlay suppression before scanning
        #[arg(long)]
        no_suppress: bool,
    },

    /// Open a page and print its content record
    Content { url: String },

    /// Keep removing overlays from a page until Ctrl-C
    Watch {
        url: String,

        /// Stop after this many seconds
        #[arg(long)]
        seconds: Option<u64>,
    },

    /// Save the raw render-tree snapshot of a page
    Snapshot {
        url: String,

        #[arg(short, long)]
        out: PathBuf,
    },

    /// Run an engine on a saved snapshot (no browser needed)
    Offline {
        #[command(subcommand)]
        action: OfflineAction,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum OfflineAction {
    /// Build the element map
    Scan { file: PathBuf },
    /// Extract the content record
    Content { file: PathBuf },
    /// Run overlay suppression and report what would be removed
    Suppress { file: PathBuf },
}
