use crate::snapshot::{SnapshotOptions, DEFAULT_CPU_SAMPLE_WINDOW, DEFAULT_TEMPERATURE_SENSOR_KEY};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const MAX_CPU_SAMPLE_WINDOW: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_listen")]
    pub listen: String,
    #[serde(default = "default_cpu_sample_window", with = "duration_text")]
    pub cpu_sample_window: Duration,
    #[serde(default = "default_temperature_sensor_key")]
    pub temperature_sensor_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            cpu_sample_window: default_cpu_sample_window(),
            temperature_sensor_key: default_temperature_sensor_key(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("не удалось прочитать файл конфигурации {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("не удалось разобрать YAML в {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("ошибка валидации конфигурации: {0}")]
    Validation(String),
}

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let path_display = path_ref.display().to_string();
        let text = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_display.clone(),
            source,
        })?;

        let cfg: Config = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path_display,
            source,
        })?;

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listen.trim().is_empty() {
            return Err(ConfigError::Validation(
                "поле listen обязательно".to_string(),
            ));
        }
        if SocketAddr::from_str(&self.listen).is_err() {
            return Err(ConfigError::Validation(
                "поле listen должно быть корректным адресом host:port".to_string(),
            ));
        }
        if self.cpu_sample_window.is_zero() {
            return Err(ConfigError::Validation(
                "cpu_sample_window должно быть > 0".to_string(),
            ));
        }
        if self.cpu_sample_window > MAX_CPU_SAMPLE_WINDOW {
            return Err(ConfigError::Validation(format!(
                "cpu_sample_window должно быть <= {}",
                humantime::format_duration(MAX_CPU_SAMPLE_WINDOW)
            )));
        }
        if self.temperature_sensor_key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "temperature_sensor_key не должен быть пустым".to_string(),
            ));
        }

        Ok(())
    }

    pub fn snapshot_options(&self) -> SnapshotOptions {
        SnapshotOptions {
            cpu_sample_window: self.cpu_sample_window,
            temperature_sensor_key: self.temperature_sensor_key.clone(),
        }
    }

    pub fn example_yaml() -> &'static str {
        include_str!("../config.yaml.example")
    }
}

/// Durations as humantime text ("200ms", "1s").
mod duration_text {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}

fn default_listen() -> String {
    "127.0.0.1:9109".to_string()
}

const fn default_cpu_sample_window() -> Duration {
    DEFAULT_CPU_SAMPLE_WINDOW
}

fn default_temperature_sensor_key() -> String {
    DEFAULT_TEMPERATURE_SENSOR_KEY.to_string()
}
