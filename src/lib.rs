//! cvengine - locate and provision a shared native vision library
//!
//! This library defines the engine service contract, [`EngineInterface`], and
//! the adapters that carry it across a process boundary:
//! - [`ipc::EngineStub`] exposes an implementer to the transport
//! - [`ipc::EngineProxy`] forwards calls through a transport handle
//! - [`ipc::as_interface`] picks the implementer itself for in-process handles
//!   and a proxy otherwise
//!
//! A filesystem-backed implementer, [`LibraryEngine`], serves versions out of
//! a library root and installs new ones from a package directory.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cvengine::{EngineConfig, LibraryEngine};
//! use cvengine::ipc::{EngineStub, as_interface};
//!
//! let config = EngineConfig::builder()
//!     .library_root("/data/cvengine/libs")
//!     .package_source("/data/cvengine/packages")
//!     .build()?;
//! let stub = EngineStub::new(Arc::new(LibraryEngine::new(&config)?));
//!
//! let engine = as_interface(stub);
//! if engine.install_version("4.9.0")? {
//!     let path = engine.get_lib_path_by_version("4.9.0")?;
//!     let libs = engine.get_library_list("4.9.0")?;
//! }
//! ```

mod config;
mod engine;
mod error;
mod interface;
pub mod ipc;
mod version;

// Re-export public types
pub use config::{ENGINE_VERSION, EngineConfig, EngineConfigBuilder};
pub use engine::{
    DirectorySource, Installer, LibraryEngine, LibraryStore, MANIFEST_FILE, PackageSource,
};
pub use error::{Error, Result};
pub use interface::{DESCRIPTOR, EngineInterface};
pub use ipc::IpcError;
pub use version::VersionQuery;
