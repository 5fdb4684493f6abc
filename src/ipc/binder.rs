//! Transport handles and local/remote interface resolution

use std::sync::Arc;

use crate::interface::{DESCRIPTOR, EngineInterface};
use crate::ipc::protocol::{IpcError, IpcRequest};
use crate::ipc::proxy::EngineProxy;

/// Opaque handle to an endpoint that serves the engine interface
///
/// A handle is either the in-process [`EngineStub`](crate::ipc::EngineStub)
/// or a connection to another process such as
/// [`SocketBinder`](crate::ipc::SocketBinder).
pub trait Binder: Send + Sync {
    /// Descriptor of the interface served behind this handle
    fn interface_descriptor(&self) -> Result<String, IpcError>;

    /// The in-process implementer for `descriptor`, if this handle is local
    fn query_local_interface(&self, descriptor: &str) -> Option<Arc<dyn EngineInterface>>;

    /// Send one request and return the encoded reply
    fn transact(&self, request: &IpcRequest) -> Result<Vec<u8>, IpcError>;
}

/// Resolve a handle to something callable
///
/// Returns the implementer itself when `binder` is local, otherwise a proxy
/// that forwards every call through `binder`.
pub fn as_interface(binder: Arc<dyn Binder>) -> Arc<dyn EngineInterface> {
    if let Some(local) = binder.query_local_interface(DESCRIPTOR) {
        tracing::trace!("resolved engine interface to local implementer");
        return local;
    }
    Arc::new(EngineProxy::new(binder))
}

/// Check the descriptor behind `binder`, then resolve it like [`as_interface`]
///
/// Fails closed: a handle serving any other interface is never bound.
pub fn bind(binder: Arc<dyn Binder>) -> Result<Arc<dyn EngineInterface>, IpcError> {
    let found = binder.interface_descriptor()?;
    if found != DESCRIPTOR {
        tracing::warn!(expected = DESCRIPTOR, found = %found, "refusing to bind engine interface");
        return Err(IpcError::DescriptorMismatch {
            expected: DESCRIPTOR.to_string(),
            found,
        });
    }
    Ok(as_interface(binder))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::stub::EngineStub;

    struct StaticEngine;

    impl EngineInterface for StaticEngine {
        fn get_engine_version(&self) -> Result<i32, IpcError> {
            Ok(3)
        }

        fn get_lib_path_by_version(&self, _version: &str) -> Result<String, IpcError> {
            Ok(String::new())
        }

        fn install_version(&self, _version: &str) -> Result<bool, IpcError> {
            Ok(false)
        }

        fn get_library_list(&self, _version: &str) -> Result<String, IpcError> {
            Ok(String::new())
        }
    }

    /// A remote handle that never reaches anything
    struct DeadBinder;

    impl Binder for DeadBinder {
        fn interface_descriptor(&self) -> Result<String, IpcError> {
            Err(IpcError::Io(std::io::ErrorKind::NotConnected.into()))
        }

        fn query_local_interface(&self, _descriptor: &str) -> Option<Arc<dyn EngineInterface>> {
            None
        }

        fn transact(&self, _request: &IpcRequest) -> Result<Vec<u8>, IpcError> {
            Err(IpcError::Io(std::io::ErrorKind::NotConnected.into()))
        }
    }

    /// A remote handle serving some other interface
    struct ForeignBinder;

    impl Binder for ForeignBinder {
        fn interface_descriptor(&self) -> Result<String, IpcError> {
            Ok("com.example.OtherInterface".to_string())
        }

        fn query_local_interface(&self, _descriptor: &str) -> Option<Arc<dyn EngineInterface>> {
            None
        }

        fn transact(&self, _request: &IpcRequest) -> Result<Vec<u8>, IpcError> {
            unreachable!("never bound")
        }
    }

    #[test]
    fn test_as_interface_returns_local_instance() {
        let engine: Arc<dyn EngineInterface> = Arc::new(StaticEngine);
        let stub = EngineStub::new(Arc::clone(&engine));

        let resolved = as_interface(stub);
        assert!(Arc::ptr_eq(&resolved, &engine));
    }

    #[test]
    fn test_as_interface_wraps_remote_in_proxy() {
        let resolved = as_interface(Arc::new(DeadBinder));
        // A proxy over a dead handle reports the failure instead of a default
        assert!(resolved.get_engine_version().is_err());
    }

    #[test]
    fn test_unreachable_remote_fails_every_method() {
        let engine = as_interface(Arc::new(DeadBinder));

        assert!(matches!(engine.get_engine_version(), Err(IpcError::Io(_))));
        assert!(matches!(
            engine.get_lib_path_by_version("4.9.0"),
            Err(IpcError::Io(_))
        ));
        assert!(matches!(engine.install_version("4.9.0"), Err(IpcError::Io(_))));
        assert!(matches!(
            engine.get_library_list("4.9.0"),
            Err(IpcError::Io(_))
        ));
    }

    #[test]
    fn test_bind_local_stub() {
        let engine: Arc<dyn EngineInterface> = Arc::new(StaticEngine);
        let bound = bind(EngineStub::new(Arc::clone(&engine))).unwrap();
        assert!(Arc::ptr_eq(&bound, &engine));
    }

    #[test]
    fn test_bind_fails_closed_on_foreign_descriptor() {
        let result = bind(Arc::new(ForeignBinder));
        match result {
            Err(IpcError::DescriptorMismatch { expected, found }) => {
                assert_eq!(expected, DESCRIPTOR);
                assert_eq!(found, "com.example.OtherInterface");
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("bound a foreign interface"),
        }
    }

    #[test]
    fn test_bind_unreachable() {
        assert!(matches!(bind(Arc::new(DeadBinder)), Err(IpcError::Io(_))));
    }
}
