//! Startup configuration: defaults, then an optional TOML file, then
//! environment variables, then the command line.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::query::DEFAULT_PAGE_SIZE;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5151/api/";
pub const CONFIG_FILE_NAME: &str = "explorer.toml";
pub const CONFIG_PATH_ENV: &str = "DATASET_EXPLORER_CONFIG";
pub const API_URL_ENV: &str = "DATASET_EXPLORER_API_URL";
pub const PAGE_SIZE_ENV: &str = "DATASET_EXPLORER_PAGE_SIZE";
/// Largest `limit` the backend's listing endpoint accepts.
pub const MAX_PAGE_SIZE: u32 = 200;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExplorerConfig {
    pub api_url: String,
    pub page_size: u32,
    pub thumbnail_cache: usize,
    pub viewer_cache: usize,
    /// Dataset to load right after startup.
    pub initial_path: Option<String>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            thumbnail_cache: 96,
            viewer_cache: 5,
            initial_path: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    api_url: Option<String>,
    page_size: Option<u32>,
    thumbnail_cache: Option<usize>,
    viewer_cache: Option<usize>,
    initial_path: Option<String>,
}

impl ExplorerConfig {
    /// Load from the process environment and arguments.
    pub fn load() -> Result<Self, ConfigError> {
        let file = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Some(PathBuf::from(path)),
            None => Some(PathBuf::from(CONFIG_FILE_NAME)).filter(|path| path.is_file()),
        };
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::from_sources(file.as_deref(), |key| std::env::var(key).ok(), &args)
    }

    pub fn from_sources(
        file: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
        args: &[String],
    ) -> Result<Self, ConfigError> {
        let mut config = ExplorerConfig::default();
        if let Some(path) = file {
            config.apply_file(read_file_config(path)?)?;
        }
        if let Some(url) = env(API_URL_ENV).filter(|value| !value.trim().is_empty()) {
            config.api_url = url.trim().to_string();
        }
        if let Some(value) = env(PAGE_SIZE_ENV) {
            config.page_size = parse_page_size(PAGE_SIZE_ENV, &value)?;
        }
        if let Some(path) = args.iter().find(|arg| !arg.starts_with('-')) {
            config.initial_path = Some(path.clone());
        }
        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) -> Result<(), ConfigError> {
        if let Some(url) = file.api_url {
            self.api_url = url;
        }
        if let Some(size) = file.page_size {
            self.page_size = parse_page_size("page_size", &size.to_string())?;
        }
        if let Some(size) = file.thumbnail_cache {
            self.thumbnail_cache = size.max(1);
        }
        if let Some(size) = file.viewer_cache {
            self.viewer_cache = size.max(1);
        }
        if file.initial_path.is_some() {
            self.initial_path = file.initial_path;
        }
        Ok(())
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_page_size(key: &'static str, value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(size) if (1..=MAX_PAGE_SIZE).contains(&size) => Ok(size),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_without_sources() {
        let config = ExplorerConfig::from_sources(None, no_env, &[]).unwrap();
        assert_eq!(config, ExplorerConfig::default());
        assert_eq!(config.page_size, 24);
    }

    #[test]
    fn env_overrides_file_and_args_set_initial_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "api_url = \"http://files:1/api/\"\npage_size = 12\n").unwrap();
        let env: HashMap<&str, &str> = HashMap::from([(API_URL_ENV, "http://env:2/api/")]);

        let config = ExplorerConfig::from_sources(
            Some(&path),
            |key| env.get(key).map(|value| value.to_string()),
            &["--verbose".to_string(), "/data/coco".to_string()],
        )
        .unwrap();
        assert_eq!(config.api_url, "http://env:2/api/");
        assert_eq!(config.page_size, 12);
        assert_eq!(config.initial_path.as_deref(), Some("/data/coco"));
    }

    #[test]
    fn bad_page_size_env_is_rejected() {
        let err = ExplorerConfig::from_sources(None, |_| Some("zero".to_string()), &[]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn page_size_above_backend_limit_is_rejected() {
        let err = ExplorerConfig::from_sources(None, |key| (key == PAGE_SIZE_ENV).then(|| "500".to_string()), &[]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: PAGE_SIZE_ENV, .. }));

        let config = ExplorerConfig::from_sources(None, |key| (key == PAGE_SIZE_ENV).then(|| "200".to_string()), &[]).unwrap();
        assert_eq!(config.page_size, MAX_PAGE_SIZE);

        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "page_size = 500\n").unwrap();
        let err = ExplorerConfig::from_sources(Some(&path), no_env, &[]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "page_size", .. }));
    }

    #[test]
    fn unknown_file_keys_are_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "theme = \"dark\"\n").unwrap();
        let err = ExplorerConfig::from_sources(Some(&path), no_env, &[]).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempdir().unwrap();
        let err = ExplorerConfig::from_sources(Some(&dir.path().join("nope.toml")), no_env, &[])
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
