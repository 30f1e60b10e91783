use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_AUTOSAVE_SECS: u64 = 30;
pub const DEFAULT_SENSOR_TIMEOUT_SECS: u64 = 20;

/// Session settings taken from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub autosave_interval: Duration,
    pub sensor_timeout: Duration,
    /// Root of the file-backed project store.
    pub data_root: PathBuf,
    pub user_id: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            autosave_interval: Duration::from_secs(DEFAULT_AUTOSAVE_SECS),
            sensor_timeout: Duration::from_secs(DEFAULT_SENSOR_TIMEOUT_SECS),
            data_root: PathBuf::from("data"),
            user_id: "local".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid value for {}: {:?}", self.key, self.value)
    }
}

impl std::error::Error for ConfigError {}

fn env_var_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: u64,
) -> Result<Duration, ConfigError> {
    match lookup(key) {
        None => Ok(Duration::from_secs(default)),
        Some(v) => match v.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(ConfigError { key, value: v }),
        },
    }
}

fn env_var_string(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl SessionConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            autosave_interval: env_var_secs(&lookup, "FURNISH_AUTOSAVE_SECS", DEFAULT_AUTOSAVE_SECS)?,
            sensor_timeout: env_var_secs(
                &lookup,
                "FURNISH_SENSOR_TIMEOUT_SECS",
                DEFAULT_SENSOR_TIMEOUT_SECS,
            )?,
            data_root: PathBuf::from(env_var_string(
                &lookup,
                "FURNISH_DATA_ROOT",
                &defaults.data_root.to_string_lossy(),
            )),
            user_id: env_var_string(&lookup, "FURNISH_USER", &defaults.user_id),
        })
    }
}
