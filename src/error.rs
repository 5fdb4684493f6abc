use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for engine setup and store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring the engine or touching its store
#[derive(Error, Debug)]
pub enum Error {
    #[error("library root does not exist: {0}")]
    LibraryRootNotFound(PathBuf),

    #[error("package source does not exist: {0}")]
    PackageSourceNotFound(PathBuf),

    #[error("invalid manifest {path}: {message}")]
    InvalidManifest { path: PathBuf, message: String },

    #[error("installation of {version} failed: {message}")]
    InstallFailed { version: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}
