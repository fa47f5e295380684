use std::path::PathBuf;

use clap::Parser;

/// Rose Day: a procedurally grown 3D rose that follows the pointer.
#[derive(Parser, Debug)]
#[command(name = "rose3d", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Seed for petal jitter; overrides `[rose] seed` from the config.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log filter override (e.g. `debug`, `rose3d=trace`).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Start with the side panel hidden.
    #[arg(long)]
    pub no_panel: bool,
}

pub fn parse() -> Args {
    Args::parse()
}
