use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Engine version reported when the configuration does not set one
pub const ENGINE_VERSION: i32 = 3;

/// Configuration for a [`LibraryEngine`](crate::LibraryEngine)
#[derive(Debug, Clone)]
pub struct EngineConfig {
    library_root: PathBuf,
    package_source: Option<PathBuf>,
    engine_version: i32,
    create_root: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            library_root: PathBuf::from("libs"),
            package_source: None,
            engine_version: ENGINE_VERSION,
            create_root: true,
        }
    }
}

impl EngineConfig {
    /// Create a new builder for EngineConfig
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Directory holding one subdirectory per installed version
    pub fn library_root(&self) -> &Path {
        &self.library_root
    }

    /// Directory new versions are installed from, if any
    pub fn package_source(&self) -> Option<&Path> {
        self.package_source.as_deref()
    }

    pub fn engine_version(&self) -> i32 {
        self.engine_version
    }

    /// Whether a missing library root is created instead of rejected
    pub fn create_root(&self) -> bool {
        self.create_root
    }
}

/// Builder for EngineConfig
#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    inner: EngineConfig,
}

impl EngineConfigBuilder {
    pub fn library_root(mut self, path: impl AsRef<Path>) -> Self {
        self.inner.library_root = path.as_ref().to_path_buf();
        self
    }

    pub fn package_source(mut self, path: impl AsRef<Path>) -> Self {
        self.inner.package_source = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn engine_version(mut self, version: i32) -> Self {
        self.inner.engine_version = version;
        self
    }

    pub fn create_root(mut self, enabled: bool) -> Self {
        self.inner.create_root = enabled;
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<EngineConfig> {
        let config = self.inner;

        if config.engine_version < 0 {
            return Err(Error::Config(format!(
                "engine version must not be negative, got {}",
                config.engine_version
            )));
        }

        if let Some(source) = &config.package_source {
            if !source.is_dir() {
                return Err(Error::PackageSourceNotFound(source.clone()));
            }
        }

        Ok(config)
    }
}
