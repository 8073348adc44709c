use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::DEFAULT_PAGE_SIZE;
use crate::paginator::{DEFAULT_JUMP_STRIDE, DEFAULT_RADIUS};
use crate::sequencer::Direction;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP app.
    Serve(ServeArgs),
    /// Open a chapter and walk to its neighbours.
    Read(ReadArgs),
    /// List a manga's chapters in one language.
    Chapters(ChaptersArgs),
    /// Show the page-number controls for a listing page (offline).
    Pages(PagesArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub addr: SocketAddr,

    /// Directory for bookmarks and admin collections.
    #[arg(long, default_value = "workspace-app")]
    pub data_dir: PathBuf,

    /// Keep collections in memory instead of `--data-dir`.
    #[arg(long)]
    pub in_memory: bool,

    /// Static web assets directory (serve if exists).
    #[arg(long, default_value = "web/dist")]
    pub web_dir: PathBuf,

    /// Catalog API base URL (overrides MANGASHELF_CATALOG_URL).
    #[arg(long)]
    pub catalog_url: Option<String>,
}

#[derive(Debug, Args)]
pub struct ReadArgs {
    /// Chapter id to open.
    #[arg(long)]
    pub chapter: String,

    #[arg(long, default_value = "next")]
    pub direction: Direction,

    /// How many chapters to move after opening.
    #[arg(long, default_value_t = 0)]
    pub steps: u32,

    /// Continue across skipped chapter numbers without stopping.
    #[arg(long)]
    pub confirm_gaps: bool,

    /// Print data-saver page URLs.
    #[arg(long)]
    pub data_saver: bool,

    #[arg(long)]
    pub catalog_url: Option<String>,
}

#[derive(Debug, Args)]
pub struct ChaptersArgs {
    /// Manga id.
    #[arg(long)]
    pub manga: String,

    /// Translated language (default: English if available, else the first).
    #[arg(long)]
    pub lang: Option<String>,

    #[arg(long)]
    pub catalog_url: Option<String>,
}

#[derive(Debug, Args)]
pub struct PagesArgs {
    /// Current page (1-based).
    #[arg(long)]
    pub page: u32,

    /// Total number of items in the listing.
    #[arg(long)]
    pub total_items: u64,

    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Pages shown on each side of the current one.
    #[arg(long, default_value_t = DEFAULT_RADIUS)]
    pub radius: u32,

    /// Step of the far jump link.
    #[arg(long, default_value_t = DEFAULT_JUMP_STRIDE)]
    pub stride: u32,
}
