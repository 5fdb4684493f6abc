//! Unix domain socket transport handle

use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::interface::{DESCRIPTOR, EngineInterface};
use crate::ipc::binder::Binder;
use crate::ipc::call::InterfaceQuery;
use crate::ipc::protocol::{self, IpcError, IpcRequest, IpcResponse};

/// Remote handle talking to an engine server over a Unix domain socket
///
/// The connection is opened on first use and kept for later calls. Calls from
/// several threads take turns on that one connection. After an I/O failure
/// the connection is dropped and the next call reconnects; the failed call
/// itself is not retried.
pub struct SocketBinder {
    socket_path: PathBuf,
    timeout: Option<Duration>,
    stream: Mutex<Option<UnixStream>>,
}

impl SocketBinder {
    /// Handle for the server listening at `socket_path`
    ///
    /// No connection is made until the first call.
    pub fn new(socket_path: impl AsRef<Path>) -> Arc<Self> {
        Self::with_timeout(socket_path, None)
    }

    /// Like [`SocketBinder::new`], bounding every read and write by `timeout`
    pub fn with_timeout(socket_path: impl AsRef<Path>, timeout: Option<Duration>) -> Arc<Self> {
        Arc::new(Self {
            socket_path: socket_path.as_ref().to_path_buf(),
            timeout,
            stream: Mutex::new(None),
        })
    }

    /// Get the socket path
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    fn connect(&self) -> Result<UnixStream, IpcError> {
        let stream = UnixStream::connect(&self.socket_path)?;
        stream.set_read_timeout(self.timeout)?;
        stream.set_write_timeout(self.timeout)?;
        tracing::debug!(path = %self.socket_path.display(), "connected to engine server");
        Ok(stream)
    }

    fn round_trip(stream: &mut UnixStream, frame: &[u8]) -> Result<IpcResponse, IpcError> {
        protocol::write_frame(stream, frame)?;
        let body = protocol::read_frame(stream)?;
        IpcResponse::from_bytes(&body)
    }
}

impl Binder for SocketBinder {
    fn interface_descriptor(&self) -> Result<String, IpcError> {
        let request = IpcRequest::new(DESCRIPTOR, InterfaceQuery::METHOD, &InterfaceQuery {})?;
        let reply = self.transact(&request)?;
        rmp_serde::from_slice(&reply).map_err(IpcError::from)
    }

    fn query_local_interface(&self, _descriptor: &str) -> Option<Arc<dyn EngineInterface>> {
        None
    }

    fn transact(&self, request: &IpcRequest) -> Result<Vec<u8>, IpcError> {
        let frame = request.to_bytes()?;

        let mut guard = self
            .stream
            .lock()
            .map_err(|_| IpcError::InvalidProtocol("connection lock poisoned".to_string()))?;

        let mut stream = match guard.take() {
            Some(stream) => stream,
            None => self.connect()?,
        };

        match Self::round_trip(&mut stream, &frame) {
            Ok(response) => {
                *guard = Some(stream);
                response.into_result()
            }
            Err(e) => {
                // Dropped: the stream may hold half a frame now
                tracing::debug!(
                    path = %self.socket_path.display(),
                    method = %request.method,
                    error = %e,
                    "engine transport failed"
                );
                Err(e)
            }
        }
    }
}
