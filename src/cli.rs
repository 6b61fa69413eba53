use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "dramawatch",
    version,
    about = "Watch drama episodes and keep a continue-watching history"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Base URL of the drama API.
    #[arg(long, global = true, env = "DRAMAWATCH_API_BASE")]
    pub api_base: Option<String>,

    /// External video player used for playback.
    #[arg(long, global = true, env = "DRAMAWATCH_PLAYER")]
    pub player: Option<PathBuf>,

    /// History database location.
    #[arg(long, global = true, env = "DRAMAWATCH_DB")]
    pub db: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Play a drama by id or by a `/watch/<id>?ep=<n>` route.
    Watch {
        target: String,
        /// Zero-based episode index; overrides the route's `ep`.
        #[arg(long)]
        ep: Option<usize>,
        #[arg(long)]
        quality: Option<u32>,
        /// Keep playing the following episodes while the player exits cleanly.
        #[arg(long)]
        autoplay: bool,
    },
    /// Print one page of a drama's episode picker.
    Episodes {
        id: String,
        #[arg(long, default_value_t = 0)]
        page: usize,
    },
    /// Resume an entry from the history (1 = most recent).
    Resume {
        #[arg(default_value_t = 1)]
        position: usize,
    },
    /// List the continue-watching history, newest first.
    History,
    /// Remove every history entry.
    Clear,
    /// Open the terminal UI (the default).
    Tui,
}
