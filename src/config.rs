use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::data::loader::DEFAULT_DATA_PATHS;

/// Environment variable naming an alternative configuration file.
pub const CONFIG_ENV: &str = "AQ_DASHBOARD_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Dashboard settings. Every field is optional in the TOML file:
///
/// ```toml
/// title = "Air Quality Beijing"
/// data_paths = ["dashboard/main_data.csv", "main_data.csv"]
/// window_width = 1280.0
/// window_height = 900.0
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub title: String,
    /// Candidate CSV locations, tried in order.
    pub data_paths: Vec<PathBuf>,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: "Air Quality Dashboard".to_string(),
            data_paths: DEFAULT_DATA_PATHS.iter().map(PathBuf::from).collect(),
            window_width: 1280.0,
            window_height: 900.0,
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `$AQ_DASHBOARD_CONFIG`, else `./dashboard.toml`, else
    /// defaults. A broken file is logged and ignored.
    pub fn load() -> Self {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::from_file(&path) {
            Ok(cfg) => {
                log::info!("Loaded config from {}", path.display());
                cfg
            }
            Err(e) => {
                log::error!("Ignoring config: {e}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let cfg = DashboardConfig::parse("title = \"Beijing\"\n", Path::new("t.toml")).unwrap();
        assert_eq!(cfg.title, "Beijing");
        assert_eq!(cfg.data_paths, DashboardConfig::default().data_paths);
    }

    #[test]
    fn test_data_paths_override() {
        let cfg = DashboardConfig::parse(
            "data_paths = [\"/srv/aq.csv\"]\nwindow_width = 800.0\n",
            Path::new("t.toml"),
        )
        .unwrap();
        assert_eq!(cfg.data_paths, [PathBuf::from("/srv/aq.csv")]);
        assert_eq!(cfg.window_width, 800.0);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let err = DashboardConfig::parse("title = [", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_from_file_reads_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.toml");
        std::fs::write(&path, "window_height = 600.0\n").unwrap();
        assert_eq!(DashboardConfig::from_file(&path).unwrap().window_height, 600.0);

        let missing = DashboardConfig::from_file(&dir.path().join("none.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
