//! Client-side adapter forwarding calls through a transport handle

use std::sync::Arc;

use crate::interface::{DESCRIPTOR, EngineInterface};
use crate::ipc::binder::Binder;
use crate::ipc::call::{
    EngineCall, GetEngineVersion, GetLibPathByVersion, GetLibraryList, InstallVersion,
};
use crate::ipc::protocol::{IpcError, IpcRequest};

/// Engine interface backed by a remote handle
///
/// Every method marshals a typed request, transacts it over the handle and
/// decodes the reply. Transport failures are returned, never papered over
/// with default values.
pub struct EngineProxy {
    remote: Arc<dyn Binder>,
}

impl EngineProxy {
    pub fn new(remote: Arc<dyn Binder>) -> Self {
        Self { remote }
    }

    /// The handle this proxy forwards to
    pub fn remote(&self) -> &Arc<dyn Binder> {
        &self.remote
    }

    fn call<C: EngineCall>(&self, call: &C) -> Result<C::Response, IpcError> {
        let request = IpcRequest::new(DESCRIPTOR, C::METHOD, call)?;
        let reply = self.remote.transact(&request).inspect_err(|e| {
            tracing::debug!(method = C::METHOD, error = %e, "engine call failed");
        })?;
        rmp_serde::from_slice(&reply).map_err(IpcError::from)
    }
}

impl EngineInterface for EngineProxy {
    fn get_engine_version(&self) -> Result<i32, IpcError> {
        self.call(&GetEngineVersion {})
    }

    fn get_lib_path_by_version(&self, version: &str) -> Result<String, IpcError> {
        self.call(&GetLibPathByVersion {
            version: version.to_string(),
        })
    }

    fn install_version(&self, version: &str) -> Result<bool, IpcError> {
        self.call(&InstallVersion {
            version: version.to_string(),
        })
    }

    fn get_library_list(&self, version: &str) -> Result<String, IpcError> {
        self.call(&GetLibraryList {
            version: version.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::stub::EngineStub;

    struct MapEngine;

    impl EngineInterface for MapEngine {
        fn get_engine_version(&self) -> Result<i32, IpcError> {
            Ok(3)
        }

        fn get_lib_path_by_version(&self, version: &str) -> Result<String, IpcError> {
            Ok(match version {
                "4.9.0" => "/opt/opencv/4.9.0".to_string(),
                _ => String::new(),
            })
        }

        fn install_version(&self, version: &str) -> Result<bool, IpcError> {
            Ok(version == "4.9.0")
        }

        fn get_library_list(&self, version: &str) -> Result<String, IpcError> {
            Ok(match version {
                "4.9.0" => "tbb;opencv_java4".to_string(),
                _ => String::new(),
            })
        }
    }

    /// Proxy that marshals through a stub without the local shortcut
    fn marshalling_proxy() -> EngineProxy {
        EngineProxy::new(EngineStub::new(Arc::new(MapEngine)))
    }

    #[test]
    fn test_proxy_marshals_every_method() {
        let proxy = marshalling_proxy();

        assert_eq!(proxy.get_engine_version().unwrap(), 3);
        assert_eq!(
            proxy.get_lib_path_by_version("4.9.0").unwrap(),
            "/opt/opencv/4.9.0"
        );
        assert_eq!(proxy.get_lib_path_by_version("2.4.3").unwrap(), "");
        assert!(proxy.install_version("4.9.0").unwrap());
        assert!(!proxy.install_version("2.4.3").unwrap());
        assert_eq!(
            proxy.get_library_list("4.9.0").unwrap(),
            "tbb;opencv_java4"
        );
    }

    #[test]
    fn test_proxy_wraps_given_handle() {
        let remote: Arc<dyn Binder> = EngineStub::new(Arc::new(MapEngine));
        let proxy = EngineProxy::new(Arc::clone(&remote));

        assert!(Arc::ptr_eq(proxy.remote(), &remote));
        assert_eq!(proxy.get_engine_version().unwrap(), 3);
    }
}

