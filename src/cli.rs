use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "gallery")]
#[command(about = "Index, browse and search on-device media", long_about = None)]
pub struct Cli {
    /// Configuration file (default: <data_dir>/gallery.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Index media files below the given roots (default: configured scan roots)
    Scan { roots: Vec<PathBuf> },
    /// List albums grouped by bucket, with counts
    Albums,
    /// List one cover per visible folder
    Covers,
    /// List every folder that holds media
    Folders,
    /// Show one page of an album
    Open {
        album: PathBuf,
        #[arg(long, default_value_t = 0)]
        page: usize,
    },
    /// Search file names
    Search {
        query: String,
        /// Only search this album
        #[arg(long)]
        album: Option<PathBuf>,
    },
    /// Show a folder and its subfolders
    Select { folder: PathBuf },
    /// Stop showing a folder
    Deselect { folder: String },
    /// Show every folder and album
    ShowAll,
    /// Show only the given bucket ids
    SelectBuckets { ids: Vec<String> },
    /// Step through albums starting at ALBUM
    Slideshow {
        album: String,
        #[arg(long, default_value_t = 0)]
        position: usize,
    },
    /// Print where the last viewed image is
    Resume,
}
