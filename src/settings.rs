use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DaybookError, Result};
use crate::tally::{validate, DEFAULT_HOME_STATE, DEFAULT_REDUCTION_PERCENT};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default = "default_home_state_code")]
    pub home_state_code: String,
    #[serde(default = "default_reduction_percent")]
    pub reduction_percent: u32,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_home_state_code() -> String {
    DEFAULT_HOME_STATE.to_string()
}

fn default_reduction_percent() -> u32 {
    DEFAULT_REDUCTION_PERCENT
}

fn default_output_dir() -> String {
    ".".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            home_state_code: default_home_state_code(),
            reduction_percent: default_reduction_percent(),
            output_dir: default_output_dir(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("daybook-tally")
}

/// The settings file: an explicit `--config` path, else the per-user default.
pub fn settings_path(config: Option<&str>) -> PathBuf {
    config
        .map(|p| PathBuf::from(shellexpand_path(p)))
        .unwrap_or_else(|| config_dir().join("settings.json"))
}

pub fn load_settings_from(path: &Path) -> Settings {
    if path.exists() {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings file");
            Settings::default()
        })
    } else {
        Settings::default()
    }
}

pub fn load_settings(config: Option<&str>) -> Settings {
    load_settings_from(&settings_path(config))
}

pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<()> {
    validate(settings.reduction_percent, &settings.home_state_code)?;
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| DaybookError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn save_settings(settings: &Settings, config: Option<&str>) -> Result<()> {
    save_settings_to(settings, &settings_path(config))
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            home_state_code: "27".to_string(),
            reduction_percent: 35,
            output_dir: "/tmp/out".to_string(),
        };
        save_settings_to(&settings, &path).unwrap();
        assert_eq!(load_settings_from(&path), settings);
    }

    #[test]
    fn test_load_returns_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let s = load_settings_from(&dir.path().join("absent.json"));
        assert_eq!(s.home_state_code, "33");
        assert_eq!(s.reduction_percent, 20);
        assert_eq!(s.output_dir, ".");
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let s: Settings = serde_json::from_str(r#"{"home_state_code": "07"}"#).unwrap();
        assert_eq!(s.home_state_code, "07");
        assert_eq!(s.reduction_percent, 20);
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_settings_from(&path), Settings::default());
    }

    #[test]
    fn test_save_creates_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep").join("nested").join("settings.json");
        save_settings_to(&Settings::default(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_save_rejects_out_of_range_reduction() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            reduction_percent: 150,
            ..Default::default()
        };
        assert!(save_settings_to(&settings, &dir.path().join("s.json")).is_err());
    }

    #[test]
    fn test_save_rejects_malformed_home_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        let settings = Settings {
            home_state_code: "2".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            save_settings_to(&settings, &path),
            Err(DaybookError::InvalidHomeState(_))
        ));
        assert!(!path.exists());
    }
}
