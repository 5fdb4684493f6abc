//! IPC server implementation
//!
//! Unix domain socket server feeding request frames to a binder, normally an
//! [`EngineStub`](crate::ipc::EngineStub).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_net::unix::{UnixListener, UnixStream};
use executor_core::{Executor, Task};
use futures_lite::io::{AsyncReadExt, AsyncWriteExt};

use crate::ipc::binder::Binder;
use crate::ipc::protocol::{self, IpcError, IpcRequest, IpcResponse};

/// IPC server that listens on a Unix domain socket
pub struct IpcServer {
    socket_path: PathBuf,
    running: Arc<AtomicBool>,
}

impl IpcServer {
    /// Create and start a new IPC server
    ///
    /// # Arguments
    /// * `binder` - The handle every incoming request is transacted on
    /// * `socket_path` - Path for the Unix domain socket
    /// * `executor` - Executor to spawn the server task on
    pub async fn new<E: Executor + Clone + 'static>(
        binder: Arc<dyn Binder>,
        socket_path: impl AsRef<Path>,
        executor: E,
    ) -> Result<Self, IpcError> {
        let socket_path = socket_path.as_ref().to_path_buf();
        let running = Arc::new(AtomicBool::new(true));

        // Remove stale socket file if present
        let _ = std::fs::remove_file(&socket_path);

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let listener = UnixListener::bind(&socket_path)?;

        tracing::info!(path = %socket_path.display(), "engine server started");

        executor
            .spawn(run_server(
                listener,
                binder,
                Arc::clone(&running),
                executor.clone(),
            ))
            .detach();

        Ok(Self {
            socket_path,
            running,
        })
    }

    /// Get the socket path
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Whether the accept loop is still meant to run
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the server
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            tracing::debug!(path = %self.socket_path.display(), "engine server stopping");
            // Wake the accept loop so it observes the flag
            let _ = std::os::unix::net::UnixStream::connect(&self.socket_path);
        }
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        self.stop();
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

/// Main server accept loop
async fn run_server<E: Executor + Clone + 'static>(
    listener: UnixListener,
    binder: Arc<dyn Binder>,
    running: Arc<AtomicBool>,
    executor: E,
) {
    while running.load(Ordering::SeqCst) {
        match listener.accept().await {
            Ok((stream, _addr)) => {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                let binder = Arc::clone(&binder);
                executor
                    .spawn(handle_connection(stream, binder, Arc::clone(&running)))
                    .detach();
            }
            Err(e) => {
                if running.load(Ordering::SeqCst) {
                    tracing::warn!(error = %e, "failed to accept engine connection");
                }
            }
        }
    }
    tracing::debug!("engine server accept loop finished");
}

/// Handle a single connection
///
/// Open connections outlive the accept loop, so each one checks `running`
/// before dispatching a frame and hangs up once the server is stopped.
async fn handle_connection(
    mut stream: UnixStream,
    binder: Arc<dyn Binder>,
    running: Arc<AtomicBool>,
) {
    while running.load(Ordering::SeqCst) {
        // Read the length prefix (4 bytes, u32 BE)
        let mut len_buf = [0u8; 4];
        if let Err(e) = stream.read_exact(&mut len_buf).await {
            if e.kind() != std::io::ErrorKind::UnexpectedEof {
                tracing::debug!(error = %e, "failed to read request length");
            }
            break;
        }

        let len = u32::from_be_bytes(len_buf) as usize;
        if let Err(e) = protocol::check_frame_len(len) {
            tracing::warn!(error = %e, "rejecting request");
            break;
        }

        let mut body = vec![0u8; len];
        if let Err(e) = stream.read_exact(&mut body).await {
            tracing::debug!(error = %e, "failed to read request body");
            break;
        }

        if !running.load(Ordering::SeqCst) {
            tracing::debug!("engine server stopped, closing connection");
            break;
        }

        let response = respond(&binder, &body).await;

        if let Err(e) = stream.write_all(&response.to_bytes()).await {
            tracing::debug!(error = %e, "failed to write response");
            break;
        }
    }
}

/// Decode one request body, transact it off the async thread, encode the reply
async fn respond(binder: &Arc<dyn Binder>, body: &[u8]) -> IpcResponse {
    let result = match IpcRequest::from_bytes(body) {
        Ok(request) => {
            tracing::debug!(method = %request.method, "handling engine request");
            let binder = Arc::clone(binder);
            blocking::unblock(move || binder.transact(&request)).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(payload) => IpcResponse::success(payload),
        Err(e) => {
            tracing::warn!(error = %e, "engine request failed");
            IpcResponse::fault(&e.to_fault()).unwrap_or_else(|_| IpcResponse {
                success: false,
                payload: vec![],
            })
        }
    }
}
