//! Application-level configuration loading: snapshot location, save debounce
//! and the accent palette offered to new contests.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::{services::save_scheduler::DEFAULT_QUIET_INTERVAL, state::model::AccentColor};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "LIVE_TALLY_CONFIG_PATH";
/// Environment variable that overrides the snapshot location.
const DATA_PATH_ENV: &str = "LIVE_TALLY_DATA_PATH";
/// Snapshot location used when neither the file nor the environment sets one.
const DEFAULT_DATA_PATH: &str = "data/contests.json";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    data_path: PathBuf,
    save_debounce: Duration,
    accents: Vec<AccentColor>,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults,
    /// then apply environment overrides.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let mut config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        accents = app_config.accents.len(),
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        if let Some(data_path) = env::var_os(DATA_PATH_ENV).filter(|value| !value.is_empty()) {
            config.data_path = PathBuf::from(data_path);
        }
        config
    }

    /// Snapshot file managed by the durable store.
    pub fn data_path(&self) -> &PathBuf {
        &self.data_path
    }

    /// Quiet interval before a debounced save fires.
    pub fn save_debounce(&self) -> Duration {
        self.save_debounce
    }

    /// Return the first palette accent not already listed in `used`.
    ///
    /// When every palette entry is taken we fall back to
    /// [`AccentColor::default()`] so callers always receive a value.
    pub fn first_unused_accent(&self, used: &[AccentColor]) -> AccentColor {
        self.accents
            .iter()
            .find(|candidate| !used.contains(candidate))
            .copied()
            .unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            save_debounce: DEFAULT_QUIET_INTERVAL,
            accents: default_accents(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    data_path: Option<PathBuf>,
    #[serde(default)]
    save_debounce_ms: Option<u64>,
    #[serde(default)]
    accents: Option<Vec<String>>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();
        let accents = value
            .accents
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| match entry.parse() {
                        Ok(accent) => Some(accent),
                        Err(err) => {
                            warn!(error = %err, "ignoring palette entry");
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or(defaults.accents);

        Self {
            data_path: value.data_path.unwrap_or(defaults.data_path),
            save_debounce: value
                .save_debounce_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.save_debounce),
            accents,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Built-in palette shipped with the binary.
fn default_accents() -> Vec<AccentColor> {
    vec![
        AccentColor::rgb(0xFF, 0x95, 0x00),
        AccentColor::rgb(0x34, 0xC7, 0x59),
        AccentColor::rgb(0xAF, 0x52, 0xDE),
        AccentColor::rgb(0xFF, 0x3B, 0x30),
        AccentColor::rgb(0x5A, 0xC8, 0xFA),
        AccentColor::rgb(0xFF, 0xCC, 0x00),
        AccentColor::rgb(0xFF, 0x2D, 0x55),
        AccentColor::rgb(0x58, 0x56, 0xD6),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let raw: RawConfig = serde_json::from_str(r#"{ "save_debounce_ms": 250 }"#).unwrap();
        let config = AppConfig::from(raw);
        assert_eq!(config.save_debounce(), Duration::from_millis(250));
        assert_eq!(config.data_path(), &PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(config.accents, default_accents());
    }

    #[test]
    fn invalid_palette_entries_are_skipped() {
        let raw: RawConfig =
            serde_json::from_str(r##"{ "accents": ["#112233", "blue", "#445566"] }"##).unwrap();
        let config = AppConfig::from(raw);
        assert_eq!(
            config.accents,
            vec![AccentColor::rgb(0x11, 0x22, 0x33), AccentColor::rgb(0x44, 0x55, 0x66)]
        );
    }

    #[test]
    fn palette_hands_out_unused_accents_first() {
        let config = AppConfig::default();
        let palette = default_accents();

        assert_eq!(config.first_unused_accent(&[]), palette[0]);
        assert_eq!(config.first_unused_accent(&palette[..2]), palette[2]);
        assert_eq!(config.first_unused_accent(&palette), AccentColor::default());
    }
}
