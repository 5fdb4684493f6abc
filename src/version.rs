//! Version queries as received from callers

use std::fmt;

/// A requested library version
///
/// The interface accepts any string. Only versions that are usable as a
/// single directory name under the library root can name an installed
/// library; everything else is treated as absent. Leading and trailing
/// whitespace is not part of the version: `" 4.9.0\n"` names `4.9.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionQuery(String);

impl VersionQuery {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The version as a directory name, if it is safe to use as one
    ///
    /// Surrounding whitespace is stripped first. Rejects empty and hidden
    /// names, path separators, and `..`.
    pub fn dir_name(&self) -> Option<&str> {
        let v = self.0.trim();
        if v.is_empty()
            || v.starts_with('.')
            || v.contains(['/', '\\', '\0'])
            || v.contains("..")
        {
            return None;
        }
        Some(v)
    }
}

impl fmt::Display for VersionQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VersionQuery {
    fn from(v: &str) -> Self {
        Self::new(v)
    }
}
