//! Configuration loading from TOML files and live, change-notifying settings

mod live;
mod settings;

pub use live::{ConfigChange, ListenerId, LiveConfig};
pub use settings::{
    default_settings, parse_assignment, CookingSettings, FactorSettings, HappySettings,
    ProgressionSettings, SettingKey, BUFF_DURATION_RANGE, BUFF_STRENGTH_RANGE,
    EXPERIENCE_GAIN_RANGE, FACTOR_RANGE, HAPPY_LEVEL_RANGE,
};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to load or adjust cooking settings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse settings TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Unknown setting '{0}'")]
    UnknownSetting(String),
    #[error("Expected key=value, got '{0}'")]
    MalformedAssignment(String),
    #[error("Setting '{key}' needs a number, got '{value}'")]
    InvalidValue { key: String, value: String },
}

/// Read a settings file and deserialize it
pub fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        path: path.to_path_buf(),
        source,
    })?;
    parse_toml(&content)
}

/// Deserialize settings from TOML text
pub fn parse_toml<T: serde::de::DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    Ok(toml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_is_reported() {
        let result: Result<CookingSettings, _> = parse_toml("[factors\nhealth = 2.0");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result: Result<CookingSettings, _> =
            load_toml(Path::new("/definitely/not/here/cooking.toml"));
        match result {
            Err(ConfigError::IoError { path, .. }) => {
                assert!(path.ends_with("cooking.toml"));
            }
            other => panic!("expected an IoError, got {:?}", other.map(|_| ())),
        }
    }
}
