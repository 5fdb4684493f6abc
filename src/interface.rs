//! The engine service contract

use crate::ipc::IpcError;

/// Descriptor token identifying the engine interface at bind time
///
/// Both sides of a connection must agree on this value; a stub rejects any
/// request carrying a different one.
pub const DESCRIPTOR: &str = "org.opencv.engine.OpenCVEngineInterface";

/// Interface of the engine service that locates and provisions the native
/// vision library.
///
/// Implemented in-process by a concrete engine (see
/// [`LibraryEngine`](crate::LibraryEngine)) and across processes by
/// [`EngineProxy`](crate::ipc::EngineProxy). Calls block until the
/// implementer or the transport answers. An `Err` always means the call could
/// not reach or return from the endpoint.
pub trait EngineInterface: Send + Sync {
    /// Returns the service version.
    fn get_engine_version(&self) -> Result<i32, IpcError>;

    /// Finds an installed library.
    ///
    /// Returns the path to the native libs of `version`, or an empty string
    /// if that version cannot be found.
    fn get_lib_path_by_version(&self, version: &str) -> Result<String, IpcError>;

    /// Tries to install `version`.
    ///
    /// Returns true if installation succeeded or the version was already
    /// installed.
    fn install_version(&self, version: &str) -> Result<bool, IpcError>;

    /// Returns the names of the libraries of `version` in loading order,
    /// separated by semicolons.
    fn get_library_list(&self, version: &str) -> Result<String, IpcError>;
}
