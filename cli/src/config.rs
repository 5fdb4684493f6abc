use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use cvengine::EngineConfig;

use crate::cli::EngineArgs;

/// Socket path used when neither the CLI nor the config file names one
pub const DEFAULT_SOCKET: &str = "/tmp/cvengine/engine.sock";

/// TOML config file structure
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Server settings
    pub server: ServerSection,

    /// Engine settings
    pub engine: EngineSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub socket: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    pub library_root: Option<PathBuf>,
    pub package_source: Option<PathBuf>,
    pub engine_version: Option<i32>,
    pub create_root: Option<bool>,
}

/// Load config from file
pub fn load_config(path: Option<&Path>) -> Result<FileConfig> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config file: {}", path.display()))
        }
        None => Ok(FileConfig::default()),
    }
}

fn parse_config(content: &str) -> Result<FileConfig> {
    Ok(toml::from_str(content)?)
}

/// Socket path: CLI > file > default
pub fn merge_socket(file: &FileConfig, cli: Option<PathBuf>) -> PathBuf {
    cli.or_else(|| file.server.socket.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SOCKET))
}

/// Merge file config with CLI args (CLI takes precedence)
pub fn merge_engine_config(file: &FileConfig, cli: &EngineArgs) -> Result<EngineConfig> {
    let mut builder = EngineConfig::builder();

    if let Some(root) = cli.library_root.as_ref().or(file.engine.library_root.as_ref()) {
        builder = builder.library_root(root);
    }

    if let Some(source) = cli
        .package_source
        .as_ref()
        .or(file.engine.package_source.as_ref())
    {
        builder = builder.package_source(source);
    }

    if let Some(version) = cli.engine_version.or(file.engine.engine_version) {
        builder = builder.engine_version(version);
    }

    if let Some(create) = file.engine.create_root {
        builder = builder.create_root(create);
    }

    builder.build().context("invalid engine configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            [server]
            socket = "/run/cvengine.sock"

            [engine]
            library_root = "/data/libs"
            engine_version = 5
            create_root = false
            "#,
        )
        .unwrap();

        assert_eq!(config.server.socket, Some(PathBuf::from("/run/cvengine.sock")));
        assert_eq!(config.engine.library_root, Some(PathBuf::from("/data/libs")));
        assert_eq!(config.engine.engine_version, Some(5));
        assert_eq!(config.engine.create_root, Some(false));
    }

    #[test]
    fn test_mistyped_value_rejected() {
        assert!(parse_config("[engine]\nengine_version = \"three\"").is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = parse_config(
            r#"
            [server]
            socket = "/run/file.sock"
            [engine]
            library_root = "/data/file-libs"
            engine_version = 5
            "#,
        )
        .unwrap();
        let cli = EngineArgs {
            library_root: Some(PathBuf::from("/data/cli-libs")),
            package_source: None,
            engine_version: Some(7),
        };

        let config = merge_engine_config(&file, &cli).unwrap();
        assert_eq!(config.library_root(), Path::new("/data/cli-libs"));
        assert_eq!(config.engine_version(), 7);

        assert_eq!(merge_socket(&file, None), PathBuf::from("/run/file.sock"));
        assert_eq!(
            merge_socket(&file, Some(PathBuf::from("/run/cli.sock"))),
            PathBuf::from("/run/cli.sock")
        );
    }

    #[test]
    fn test_defaults_without_file() {
        let config = merge_engine_config(&FileConfig::default(), &EngineArgs::default()).unwrap();
        assert_eq!(config.engine_version(), cvengine::ENGINE_VERSION);
        assert_eq!(
            merge_socket(&FileConfig::default(), None),
            PathBuf::from(DEFAULT_SOCKET)
        );
    }

    #[test]
    fn test_missing_package_source_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cli = EngineArgs {
            package_source: Some(dir.path().join("absent")),
            ..EngineArgs::default()
        };
        assert!(merge_engine_config(&FileConfig::default(), &cli).is_err());
    }
}
