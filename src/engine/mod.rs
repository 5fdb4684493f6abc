//! Filesystem-backed engine implementation

mod install;
mod store;

pub use install::{DirectorySource, Installer, PackageSource};
pub use store::{LibraryStore, MANIFEST_FILE};

use crate::config::EngineConfig;
use crate::interface::EngineInterface;
use crate::ipc::IpcError;
use crate::version::VersionQuery;

/// Engine serving library versions from a [`LibraryStore`]
///
/// Store errors never cross the interface: lookups answer empty and installs
/// answer false, with the cause logged.
pub struct LibraryEngine {
    engine_version: i32,
    store: LibraryStore,
    installer: Installer,
}

impl LibraryEngine {
    /// Open the store described by `config`
    pub fn new(config: &EngineConfig) -> crate::Result<Self> {
        let store = LibraryStore::open(config.library_root(), config.create_root())?;

        let source: Option<Box<dyn PackageSource>> = match config.package_source() {
            Some(path) => Some(Box::new(DirectorySource::new(path)?)),
            None => None,
        };

        Ok(Self::with_source(config.engine_version(), store, source))
    }

    /// Assemble an engine from parts, for custom package sources
    pub fn with_source(
        engine_version: i32,
        store: LibraryStore,
        source: Option<Box<dyn PackageSource>>,
    ) -> Self {
        tracing::debug!(
            root = %store.root().display(),
            installs = source.is_some(),
            "library engine ready"
        );
        Self {
            engine_version,
            store,
            installer: Installer::new(source),
        }
    }

    pub fn store(&self) -> &LibraryStore {
        &self.store
    }
}

impl EngineInterface for LibraryEngine {
    fn get_engine_version(&self) -> Result<i32, IpcError> {
        Ok(self.engine_version)
    }

    fn get_lib_path_by_version(&self, version: &str) -> Result<String, IpcError> {
        let path = self
            .store
            .lib_path(&VersionQuery::from(version))
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        tracing::debug!(version, path = %path, "library path lookup");
        Ok(path)
    }

    fn install_version(&self, version: &str) -> Result<bool, IpcError> {
        match self.installer.install(&self.store, &VersionQuery::from(version)) {
            Ok(installed) => Ok(installed),
            Err(e) => {
                tracing::warn!(version, error = %e, "install request failed");
                Ok(false)
            }
        }
    }

    fn get_library_list(&self, version: &str) -> Result<String, IpcError> {
        match self.store.library_list(&VersionQuery::from(version)) {
            Ok(libraries) => Ok(libraries.join(";")),
            Err(e) => {
                tracing::warn!(version, error = %e, "cannot read library list");
                Ok(String::new())
            }
        }
    }
}
