//! Server-side adapter exposing an implementer to the transport

use std::sync::Arc;

use crate::interface::{DESCRIPTOR, EngineInterface};
use crate::ipc::binder::Binder;
use crate::ipc::call::InterfaceQuery;
use crate::ipc::protocol::{IpcError, IpcRequest};
use crate::ipc::router::IpcRouter;

/// Local binder wrapping a concrete engine
///
/// The stub answers [`Binder::query_local_interface`] with the wrapped
/// implementer so in-process callers skip marshalling, and decodes raw
/// requests for the socket server.
pub struct EngineStub {
    engine: Arc<dyn EngineInterface>,
    router: IpcRouter,
}

impl EngineStub {
    /// Attach `engine` under the engine descriptor
    pub fn new(engine: Arc<dyn EngineInterface>) -> Arc<Self> {
        Arc::new(Self {
            engine,
            router: IpcRouter::engine(),
        })
    }

    /// The wrapped implementer
    pub fn engine(&self) -> &Arc<dyn EngineInterface> {
        &self.engine
    }
}

impl Binder for EngineStub {
    fn interface_descriptor(&self) -> Result<String, IpcError> {
        Ok(DESCRIPTOR.to_string())
    }

    fn query_local_interface(&self, descriptor: &str) -> Option<Arc<dyn EngineInterface>> {
        (descriptor == DESCRIPTOR).then(|| Arc::clone(&self.engine))
    }

    fn transact(&self, request: &IpcRequest) -> Result<Vec<u8>, IpcError> {
        if request.method == InterfaceQuery::METHOD {
            return Ok(rmp_serde::to_vec(&DESCRIPTOR)?);
        }

        if request.descriptor != DESCRIPTOR {
            return Err(IpcError::DescriptorMismatch {
                expected: DESCRIPTOR.to_string(),
                found: request.descriptor.clone(),
            });
        }

        tracing::debug!(method = %request.method, "dispatching engine call");
        self.router
            .handle(self.engine.as_ref(), &request.method, &request.params)
    }
}
