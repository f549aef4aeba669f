use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::version::matcher::RangeSyntax;

/// Directory and file names under the data directory
pub const APP_NAME: &str = "versioned-wrapper";
pub const LOG_FILE_NAME: &str = "versioned-wrapper.log";

/// Default log level when neither the config nor `RUST_LOG` sets one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Top-level configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub resolver: ResolverConfig,
    pub log: LogConfig,
}

/// Range resolution configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverConfig {
    /// Dialect ranges are written in
    pub syntax: RangeSyntax,
    /// Maximum number of memoized resolutions; unbounded when absent
    pub cache_capacity: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LogConfig {
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
    /// Write to [`log_path`] instead of stderr
    pub file: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            json: false,
            file: false,
        }
    }
}

impl Config {
    /// Read a JSON config file. Missing fields fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Returns the path to the data directory for versioned-wrapper.
/// Uses $XDG_DATA_HOME/versioned-wrapper if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/versioned-wrapper,
/// or ./versioned-wrapper if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join(LOG_FILE_NAME)
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join(APP_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_partial_object_uses_defaults_for_missing_fields() {
        let result = serde_json::from_value::<Config>(json!({
            "resolver": {
                "cacheCapacity": 64
            }
        }))
        .unwrap();

        assert_eq!(result.resolver.syntax, RangeSyntax::Npm);
        assert_eq!(result.resolver.cache_capacity, Some(64));
        assert_eq!(result.log, LogConfig::default());
    }

    #[test]
    fn config_from_full_object_parses_all_fields() {
        let result = serde_json::from_value::<Config>(json!({
            "resolver": {
                "syntax": "cargo",
                "cacheCapacity": null
            },
            "log": {
                "level": "debug",
                "json": true,
                "file": true
            }
        }))
        .unwrap();

        assert_eq!(
            result,
            Config {
                resolver: ResolverConfig {
                    syntax: RangeSyntax::Cargo,
                    cache_capacity: None,
                },
                log: LogConfig {
                    level: "debug".to_string(),
                    json: true,
                    file: true,
                },
            }
        );
    }

    #[test]
    fn config_rejects_unknown_syntax() {
        let result = serde_json::from_value::<Config>(json!({
            "resolver": { "syntax": "pypi" }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn load_reads_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"log": {{"level": "trace"}}}}"#).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.log.level, "trace");
        assert_eq!(config.resolver, ResolverConfig::default());
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { ref path, .. } if path == file.path()));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn data_dir_with_env_uses_xdg_data_home_when_set() {
        let path = data_dir_with_env(
            Some("/custom/data".to_string()),
            Some(PathBuf::from("/home/user")),
        );
        assert_eq!(path, PathBuf::from("/custom/data/versioned-wrapper"));
    }

    #[test]
    fn data_dir_with_env_falls_back_to_home() {
        let path = data_dir_with_env(None, Some(PathBuf::from("/home/user")));
        assert_eq!(
            path,
            PathBuf::from("/home/user/.local/share/versioned-wrapper")
        );
    }

    #[test]
    fn log_path_is_log_file_inside_data_dir() {
        let path = log_path();
        assert_eq!(path.parent(), Some(data_dir().as_path()));
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some(LOG_FILE_NAME));
    }

    #[test]
    fn data_dir_with_env_falls_back_to_current_dir() {
        let path = data_dir_with_env(None, None);
        assert_eq!(path, PathBuf::from("./versioned-wrapper"));
    }
}
