//! Inter-Process Communication (IPC) for the engine interface
//!
//! This module carries [`EngineInterface`](crate::EngineInterface) calls across
//! a process boundary. Communication happens over Unix domain sockets using
//! length-prefixed frames with MessagePack payloads.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cvengine::ipc::{EngineStub, IpcServer, SocketBinder, bind};
//!
//! // Serving side
//! let stub = EngineStub::new(Arc::new(engine));
//! let server = IpcServer::new(stub, "/run/cvengine.sock", executor).await?;
//!
//! // Calling side
//! let engine = bind(SocketBinder::new("/run/cvengine.sock"))?;
//! let path = engine.get_lib_path_by_version("4.9.0")?;
//! ```

mod binder;
mod call;
mod client;
mod protocol;
mod proxy;
mod router;
mod server;
mod stub;

pub use binder::{Binder, as_interface, bind};
pub use call::{
    EngineCall, GetEngineVersion, GetLibPathByVersion, GetLibraryList, InstallVersion,
    InterfaceQuery,
};
pub use client::SocketBinder;
pub use protocol::{FaultKind, IpcError, IpcRequest, IpcResponse, MAX_FRAME_LEN, RemoteFault};
pub use proxy::EngineProxy;
pub use router::IpcRouter;
pub use server::IpcServer;
pub use stub::EngineStub;
