//! Installing library versions into the store

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::engine::store::{LibraryStore, read_library_list};
use crate::error::{Error, Result};
use crate::version::VersionQuery;

/// Somewhere new library versions can be fetched from
pub trait PackageSource: Send + Sync {
    /// Copy the package of `version` into the empty directory `dest`
    ///
    /// Returns `Ok(false)` when the source does not offer that version.
    fn fetch(&self, version: &str, dest: &Path) -> Result<bool>;
}

/// Package source laid out like a library root: one directory per version
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(Error::PackageSourceNotFound(root.to_path_buf()));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }
}

impl PackageSource for DirectorySource {
    fn fetch(&self, version: &str, dest: &Path) -> Result<bool> {
        let src = self.root.join(version);
        if !src.is_dir() {
            return Ok(false);
        }
        copy_dir_recursive(&src, dest)?;
        Ok(true)
    }
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst)?;

    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }

    Ok(())
}

/// Serialized, all-or-nothing installs into a [`LibraryStore`]
///
/// A version is fetched into a hidden staging directory next to the installed
/// ones and renamed into place once it holds at least one library.
pub struct Installer {
    source: Option<Box<dyn PackageSource>>,
    lock: Mutex<()>,
}

impl Installer {
    pub fn new(source: Option<Box<dyn PackageSource>>) -> Self {
        Self {
            source,
            lock: Mutex::new(()),
        }
    }

    /// Make sure `version` is installed in `store`
    ///
    /// Returns true when it was already installed or got installed now, false
    /// when no source offers it.
    pub fn install(&self, store: &LibraryStore, version: &VersionQuery) -> Result<bool> {
        let Some(name) = version.dir_name() else {
            tracing::debug!(version = %version, "ignoring install of unusable version name");
            return Ok(false);
        };

        let _guard = self.lock.lock().map_err(|_| Error::InstallFailed {
            version: name.to_string(),
            message: "an earlier install panicked while holding the installer lock".to_string(),
        })?;

        if store.is_installed(version) {
            tracing::debug!(version = name, "version already installed");
            return Ok(true);
        }

        let Some(source) = &self.source else {
            tracing::info!(version = name, "no package source configured, cannot install");
            return Ok(false);
        };

        let staging = store
            .root()
            .join(format!(".staging-{name}-{:08x}", rand::random::<u32>()));

        let result = stage(&**source, name, &staging).and_then(|fetched| {
            if fetched {
                std::fs::rename(&staging, store.root().join(name))?;
            }
            Ok(fetched)
        });

        if staging.exists() {
            if let Err(e) = remove_dir_all::remove_dir_all(&staging) {
                tracing::warn!(path = %staging.display(), error = %e, "failed to clean staging directory");
            }
        }

        match &result {
            Ok(true) => tracing::info!(version = name, "installed library version"),
            Ok(false) => tracing::info!(version = name, "version not offered by package source"),
            Err(e) => tracing::warn!(version = name, error = %e, "installation failed"),
        }
        result
    }
}

/// Fetch `version` into `staging` and check it holds something loadable
fn stage(source: &dyn PackageSource, version: &str, staging: &Path) -> Result<bool> {
    std::fs::create_dir_all(staging)?;

    if !source.fetch(version, staging)? {
        return Ok(false);
    }

    if read_library_list(staging)?.is_empty() {
        return Err(Error::InstallFailed {
            version: version.to_string(),
            message: "package contains no libraries".to_string(),
        });
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    struct Fixture {
        _dir: tempfile::TempDir,
        store: LibraryStore,
        source_root: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let source_root = dir.path().join("packages");

        let pkg = source_root.join("4.9.0");
        fs::create_dir_all(pkg.join("share")).unwrap();
        fs::write(pkg.join("libopencv_java4.so"), b"elf").unwrap();
        fs::write(pkg.join("share").join("LICENSE"), b"text").unwrap();

        fs::create_dir_all(source_root.join("0.0.1")).unwrap();
        fs::write(source_root.join("0.0.1").join("README"), b"empty").unwrap();

        let store = LibraryStore::open(dir.path().join("libs"), true).unwrap();
        Fixture {
            _dir: dir,
            store,
            source_root,
        }
    }

    fn installer(f: &Fixture) -> Installer {
        Installer::new(Some(Box::new(DirectorySource::new(&f.source_root).unwrap())))
    }

    #[test]
    fn test_install_copies_package() {
        let f = fixture();
        let installer = installer(&f);

        assert!(installer.install(&f.store, &"4.9.0".into()).unwrap());
        let dir = f.store.lib_path(&"4.9.0".into()).unwrap();
        assert!(dir.join("libopencv_java4.so").is_file());
        assert!(dir.join("share").join("LICENSE").is_file());
    }

    #[test]
    fn test_install_twice_is_idempotent() {
        let f = fixture();
        let installer = installer(&f);

        assert!(installer.install(&f.store, &"4.9.0".into()).unwrap());
        assert!(installer.install(&f.store, &"4.9.0".into()).unwrap());
        assert_eq!(f.store.installed_versions().unwrap(), ["4.9.0"]);
    }

    #[test]
    fn test_install_unknown_version() {
        let f = fixture();
        assert!(!installer(&f).install(&f.store, &"9.9.9".into()).unwrap());
        assert!(f.store.installed_versions().unwrap().is_empty());
    }

    #[test]
    fn test_install_without_source() {
        let f = fixture();
        let installer = Installer::new(None);
        assert!(!installer.install(&f.store, &"4.9.0".into()).unwrap());
    }

    #[test]
    fn test_empty_package_rolls_back() {
        let f = fixture();
        let result = installer(&f).install(&f.store, &"0.0.1".into());

        assert!(matches!(result, Err(Error::InstallFailed { .. })));
        // Neither the version nor a staging directory is left behind
        assert_eq!(fs::read_dir(f.store.root()).unwrap().count(), 0);
    }

    #[test]
    fn test_unusable_version_name() {
        let f = fixture();
        assert!(!installer(&f).install(&f.store, &"../packages/4.9.0".into()).unwrap());
    }

    #[test]
    fn test_poisoned_lock_fails_install() {
        let f = fixture();
        let installer = installer(&f);

        std::thread::scope(|scope| {
            let poisoned = scope
                .spawn(|| {
                    let _guard = installer.lock.lock().unwrap();
                    panic!("install aborted");
                })
                .join();
            assert!(poisoned.is_err());
        });

        let result = installer.install(&f.store, &"4.9.0".into());
        assert!(matches!(
            result,
            Err(Error::InstallFailed { ref version, .. }) if version == "4.9.0"
        ));
        assert!(!f.store.is_installed(&"4.9.0".into()));
    }
}

