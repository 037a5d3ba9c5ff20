use std::path::PathBuf;

use clap::Parser;

/// meshview: interactive viewer for generated meshes.
#[derive(Parser, Debug)]
#[command(name = "meshview", version, about)]
pub struct Args {
    /// Mesh-generation response to display (JSON with `vertices` and `faces`).
    #[arg(short = 'm', long)]
    pub mesh: Option<PathBuf>,

    /// Viewer config (JSON, camelCase keys). Missing keys use defaults.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Initial window width in logical pixels.
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Initial window height in logical pixels.
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Log filter override (env_logger syntax, e.g. "debug").
    #[arg(long)]
    pub log: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}
