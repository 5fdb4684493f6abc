use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cvengine")]
#[command(version)]
#[command(about = "Engine service locating and provisioning the native vision library")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the engine interface on a Unix socket
    Serve(ServeArgs),

    /// List installed library versions
    List(EngineArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Socket path to listen on
    #[arg(long, env = "CVENGINE_SOCKET")]
    pub socket: Option<PathBuf>,

    #[command(flatten)]
    pub engine: EngineArgs,
}

/// Engine arguments shared across subcommands
#[derive(Args, Default)]
pub struct EngineArgs {
    /// Directory holding one subdirectory per installed version
    #[arg(long)]
    pub library_root: Option<PathBuf>,

    /// Directory new versions are installed from
    #[arg(long)]
    pub package_source: Option<PathBuf>,

    /// Engine version reported to clients
    #[arg(long)]
    pub engine_version: Option<i32>,
}
