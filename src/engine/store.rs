//! On-disk layout of installed library versions
//!
//! ```text
//! <library_root>/
//!   4.9.0/
//!     manifest.toml        libraries = ["tbb", "opencv_java4"]
//!     libtbb.so
//!     libopencv_java4.so
//!   .staging-4.10.0-1a2b3c4d/   (install in progress, never reported)
//! ```
//!
//! Without a manifest the load order is the sorted list of `lib<name>.so`
//! files in the version directory.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::version::VersionQuery;

/// Name of the per-version manifest file
pub const MANIFEST_FILE: &str = "manifest.toml";

#[derive(Debug, Deserialize)]
struct Manifest {
    libraries: Vec<String>,
}

/// Installed versions under a library root directory
#[derive(Debug, Clone)]
pub struct LibraryStore {
    root: PathBuf,
}

impl LibraryStore {
    /// Open the store at `root`, creating the directory when `create` is set
    pub fn open(root: impl AsRef<Path>, create: bool) -> Result<Self> {
        let root = root.as_ref();

        if !root.is_dir() {
            if !create {
                return Err(Error::LibraryRootNotFound(root.to_path_buf()));
            }
            std::fs::create_dir_all(root)?;
            tracing::debug!(path = %root.display(), "created library root");
        }

        Ok(Self {
            root: std::fs::canonicalize(root)?,
        })
    }

    /// Absolute path of the library root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory `version` lives in, installed or not
    ///
    /// `None` when the version cannot name a directory.
    pub fn version_dir(&self, version: &VersionQuery) -> Option<PathBuf> {
        version.dir_name().map(|name| self.root.join(name))
    }

    pub fn is_installed(&self, version: &VersionQuery) -> bool {
        self.version_dir(version).is_some_and(|dir| dir.is_dir())
    }

    /// Path to the native libs of `version`, if installed
    pub fn lib_path(&self, version: &VersionQuery) -> Option<PathBuf> {
        self.version_dir(version).filter(|dir| dir.is_dir())
    }

    /// Library names of `version` in load order; empty when not installed
    pub fn library_list(&self, version: &VersionQuery) -> Result<Vec<String>> {
        match self.lib_path(version) {
            Some(dir) => read_library_list(&dir),
            None => Ok(Vec::new()),
        }
    }

    /// Names of all installed versions, sorted
    pub fn installed_versions(&self) -> Result<Vec<String>> {
        let mut versions = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with('.') {
                versions.push(name);
            }
        }
        versions.sort();
        Ok(versions)
    }
}

/// Load order of the libraries in `dir`
pub(crate) fn read_library_list(dir: &Path) -> Result<Vec<String>> {
    let manifest_path = dir.join(MANIFEST_FILE);

    if manifest_path.is_file() {
        let content = std::fs::read_to_string(&manifest_path)?;
        let manifest: Manifest = toml::from_str(&content).map_err(|e| Error::InvalidManifest {
            path: manifest_path.clone(),
            message: e.to_string(),
        })?;

        let libraries: Vec<String> = manifest
            .libraries
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();

        if let Some(bad) = libraries.iter().find(|name| name.contains(';')) {
            return Err(Error::InvalidManifest {
                path: manifest_path,
                message: format!("library name contains ';': {bad}"),
            });
        }
        return Ok(libraries);
    }

    let mut libraries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if let Some(lib) = name
            .strip_prefix("lib")
            .and_then(|rest| rest.strip_suffix(".so"))
        {
            if !lib.is_empty() {
                libraries.push(lib.to_string());
            }
        }
    }
    libraries.sort();
    Ok(libraries)
}
