//! IPC router for dispatching engine calls

use std::collections::HashMap;

use crate::interface::EngineInterface;
use crate::ipc::call::{
    EngineCall, GetEngineVersion, GetLibPathByVersion, GetLibraryList, InstallVersion,
};
use crate::ipc::protocol::IpcError;

/// Type-erased handler function
type ErasedHandler =
    Box<dyn Fn(&dyn EngineInterface, &[u8]) -> Result<Vec<u8>, IpcError> + Send + Sync>;

/// Router that dispatches raw requests to typed call handlers
///
/// The router stores type-erased handlers internally, but registration is type-safe
/// via the `EngineCall` trait.
pub struct IpcRouter {
    handlers: HashMap<&'static str, ErasedHandler>,
}

impl IpcRouter {
    /// Create a new empty router
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Router with every method of the engine interface registered
    pub fn engine() -> Self {
        Self::new()
            .register::<GetEngineVersion>()
            .register::<GetLibPathByVersion>()
            .register::<InstallVersion>()
            .register::<GetLibraryList>()
    }

    /// Register a call type under its method name
    ///
    /// Incoming params for that method are decoded as `C`, invoked, and the
    /// response is encoded back to MessagePack.
    pub fn register<C: EngineCall>(mut self) -> Self {
        let handler: ErasedHandler = Box::new(|engine: &dyn EngineInterface, params: &[u8]| {
            let call: C = rmp_serde::from_slice(params)?;
            let response = call.invoke(engine)?;
            Ok(rmp_serde::to_vec(&response)?)
        });

        self.handlers.insert(C::METHOD, handler);
        self
    }

    /// Handle an incoming request against `engine`
    pub fn handle(
        &self,
        engine: &dyn EngineInterface,
        method: &str,
        params: &[u8],
    ) -> Result<Vec<u8>, IpcError> {
        let handler = self
            .handlers
            .get(method)
            .ok_or_else(|| IpcError::UnknownMethod(method.to_string()))?;

        handler(engine, params)
    }

    /// Get the registered method names
    pub fn methods(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }
}

impl Default for IpcRouter {
    fn default() -> Self {
        Self::new()
    }
}
