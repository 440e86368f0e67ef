use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};

use crate::error::ConfigError;
use crate::guideline::DEFAULT_GUIDELINE_SCALE;
use crate::list::DEFAULT_SETTLE_DELAY;
use crate::viewer::{ViewMode, DEFAULT_PRIMARY_SCALE};

pub fn project_dirs() -> Result<ProjectDirs, ConfigError> {
    ProjectDirs::from("net", "diffview", "diffview").ok_or(ConfigError::NoProjectDirs)
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub initial_scale: f32,
    pub guideline_scale: f32,
    pub view_mode: ViewMode,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "scroll_settle_ms")]
    pub scroll_settle: Duration,
    pub log_filter: String,
    pub pdfium_library: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_scale: DEFAULT_PRIMARY_SCALE,
            guideline_scale: DEFAULT_GUIDELINE_SCALE,
            view_mode: ViewMode::default(),
            scroll_settle: DEFAULT_SETTLE_DELAY,
            log_filter: "info".to_string(),
            pdfium_library: None,
        }
    }
}

impl Config {
    pub fn default_path(dirs: &ProjectDirs) -> PathBuf {
        dirs.config_dir().join("config.toml")
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.scroll_settle, Duration::from_millis(350));
    }

    #[test]
    fn partial_file_overrides_named_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "view_mode = \"revised-only\"\nscroll_settle_ms = 500\nlog_filter = \"diffview_core=debug\"\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.view_mode, ViewMode::RevisedOnly);
        assert_eq!(config.scroll_settle, Duration::from_millis(500));
        assert_eq!(config.log_filter, "diffview_core=debug");
        assert_eq!(config.initial_scale, DEFAULT_PRIMARY_SCALE);
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "initial_scale = \"big\"").unwrap();
        match Config::load(&path) {
            Err(ConfigError::Decode { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
