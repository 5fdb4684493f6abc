//! Typed engine calls shared by the stub and the proxy

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::interface::EngineInterface;
use crate::ipc::protocol::IpcError;

/// A single engine call: its wire name, its parameters and its reply type
///
/// The call struct is what travels as the MessagePack params of a request.
/// The proxy builds one per method invocation; the router decodes it on the
/// serving side and runs [`EngineCall::invoke`] against the implementer.
pub trait EngineCall: Serialize + DeserializeOwned + Send + 'static {
    /// The reply type returned by this call
    type Response: Serialize + DeserializeOwned + Send;

    /// Method name used for wire protocol dispatch
    const METHOD: &'static str;

    /// Run this call against a concrete implementer
    fn invoke(self, engine: &dyn EngineInterface) -> Result<Self::Response, IpcError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetEngineVersion {}

impl EngineCall for GetEngineVersion {
    type Response = i32;
    const METHOD: &'static str = "getEngineVersion";

    fn invoke(self, engine: &dyn EngineInterface) -> Result<i32, IpcError> {
        engine.get_engine_version()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetLibPathByVersion {
    pub version: String,
}

impl EngineCall for GetLibPathByVersion {
    type Response = String;
    const METHOD: &'static str = "getLibPathByVersion";

    fn invoke(self, engine: &dyn EngineInterface) -> Result<String, IpcError> {
        engine.get_lib_path_by_version(&self.version)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallVersion {
    pub version: String,
}

impl EngineCall for InstallVersion {
    type Response = bool;
    const METHOD: &'static str = "installVersion";

    fn invoke(self, engine: &dyn EngineInterface) -> Result<bool, IpcError> {
        engine.install_version(&self.version)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetLibraryList {
    pub version: String,
}

impl EngineCall for GetLibraryList {
    type Response = String;
    const METHOD: &'static str = "getLibraryList";

    fn invoke(self, engine: &dyn EngineInterface) -> Result<String, IpcError> {
        engine.get_library_list(&self.version)
    }
}

/// Reserved method answering with the interface descriptor of the endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceQuery {}

impl InterfaceQuery {
    pub const METHOD: &'static str = "_interface";
}
