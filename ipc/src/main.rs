//! CLI tool issuing engine interface calls to a cvengine server
//!
//! Usage:
//!   cvengine-ipc version
//!   cvengine-ipc lib-path 4.9.0
//!   cvengine-ipc --socket /run/cvengine.sock install 4.9.0

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::{Value, json};

use cvengine::{EngineInterface, IpcError};
use cvengine::ipc::{Binder, SocketBinder, bind};

/// CLI tool issuing engine interface calls to a cvengine server
#[derive(Parser)]
#[command(name = "cvengine-ipc")]
#[command(about = "Call the cvengine engine interface over its socket")]
struct Cli {
    /// Socket path of the engine server
    #[arg(long, env = "CVENGINE_SOCKET")]
    socket: PathBuf,

    /// Give up on a call after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    call: Call,
}

#[derive(Subcommand)]
enum Call {
    /// Print the engine version
    Version,
    /// Print the library path of a version (empty if not installed)
    LibPath { version: String },
    /// Install a version
    Install { version: String },
    /// Print the libraries of a version in load order
    Libraries { version: String },
    /// Print the interface descriptor served on the socket
    Descriptor,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let binder = SocketBinder::with_timeout(&cli.socket, cli.timeout_ms.map(Duration::from_millis));

    match run(binder, &cli.call) {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: JSON encoding failed: {e}");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(binder: Arc<SocketBinder>, call: &Call) -> Result<Value, IpcError> {
    let value = match call {
        Call::Descriptor => json!(binder.interface_descriptor()?),
        Call::Version => json!(bind(binder)?.get_engine_version()?),
        Call::LibPath { version } => json!(bind(binder)?.get_lib_path_by_version(version)?),
        Call::Install { version } => json!(bind(binder)?.install_version(version)?),
        Call::Libraries { version } => {
            let list = bind(binder)?.get_library_list(version)?;
            let names: Vec<&str> = list.split(';').filter(|s| !s.is_empty()).collect();
            json!(names)
        }
    };
    Ok(value)
}
