//! TOML-based application configuration.
//!
//! Stores:
//! - Scoring rules (multiplier step, penalty, bounds, streak lookback)
//! - Notification preferences
//! - Where the engine snapshot lives
//!
//! Configuration is stored at `~/.config/habitquest/config.toml`.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::engine::Rules;
use crate::error::{ConfigError, Result};
use crate::notifications::{NotificationQueue, DEFAULT_TTL_MS};

/// Longest notification lifetime accepted from config (one day).
const MAX_TTL_MS: u64 = 86_400_000;

/// Notification configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// How long a notification stays visible.
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,
}

/// Snapshot storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// File name of the JSON snapshot, relative to the data directory.
    #[serde(default = "default_state_file")]
    pub state_file: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/habitquest/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rules: Rules,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_true() -> bool {
    true
}
fn default_ttl_ms() -> u64 {
    DEFAULT_TTL_MS as u64
}
fn default_state_file() -> String {
    "state.json".into()
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_ms: default_ttl_ms(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        if key.is_empty() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) => return Err(unknown()),
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// `config.toml` in the data directory.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// holds invalid rules, or if the default config cannot be written.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rules.validate()?;
        if self.notifications.ttl_ms > MAX_TTL_MS {
            return Err(ConfigError::InvalidValue {
                key: "notifications.ttl_ms".into(),
                message: format!("must be at most {MAX_TTL_MS}"),
            });
        }
        if self.storage.state_file.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "storage.state_file".into(),
                message: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Every leaf as `(dot.path, value)`, in section order.
    pub fn entries(&self) -> Vec<(String, String)> {
        fn walk(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
            match value {
                serde_json::Value::Object(map) => {
                    for (k, v) in map {
                        let path = if prefix.is_empty() {
                            k.clone()
                        } else {
                            format!("{prefix}.{k}")
                        };
                        walk(&path, v, out);
                    }
                }
                serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }

        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            walk("", &json, &mut out);
        }
        out
    }

    /// Set a value by dot-separated key. The new value must parse as the
    /// type of the existing one and the resulting config must validate;
    /// otherwise `self` is left unchanged. Does not save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the result fails validation.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::milliseconds(self.notifications.ttl_ms.min(MAX_TTL_MS) as i64)
    }

    /// A queue configured from `[notifications]`.
    pub fn notification_queue(&self) -> NotificationQueue {
        if self.notifications.enabled {
            NotificationQueue::new(self.notification_ttl())
        } else {
            NotificationQueue::disabled()
        }
    }

    /// Snapshot path inside `dir`.
    pub fn state_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.storage.state_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.notifications.ttl_ms, 3_500);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[rules]\nfail_penalty = 0.6\n").unwrap();
        assert_eq!(parsed.rules.fail_penalty, 0.6);
        assert_eq!(parsed.rules.multiplier_step, 0.2);
        assert_eq!(parsed.storage.state_file, "state.json");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("notifications.enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("rules.global_streak_lookback_days").as_deref(), Some("365"));
        assert_eq!(cfg.get("storage.state_file").as_deref(), Some("state.json"));
        assert!(cfg.get("rules.missing_key").is_none());
    }

    #[test]
    fn set_updates_nested_number() {
        let mut cfg = Config::default();
        cfg.set("rules.fail_penalty", "0.6").unwrap();
        assert_eq!(cfg.rules.fail_penalty, 0.6);
        cfg.set("notifications.ttl_ms", "5000").unwrap();
        assert_eq!(cfg.notification_ttl(), Duration::milliseconds(5_000));
    }

    #[test]
    fn set_rejects_unknown_key_and_invalid_type() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("rules.nonexistent_key", "1"),
            Err(crate::error::CoreError::Config(ConfigError::UnknownKey(_)))
        ));
        assert!(cfg.set("notifications.enabled", "not_a_bool").is_err());
        assert!(cfg.set("rules", "1").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn set_rejects_rules_that_fail_validation() {
        let mut cfg = Config::default();
        assert!(cfg.set("rules.min_multiplier", "2.5").is_err());
        assert!(cfg.set("rules.global_streak_lookback_days", "1.5").is_err());
        assert_eq!(cfg.rules, Rules::default());
    }

    #[test]
    fn entries_list_every_leaf() {
        let keys: Vec<String> = Config::default().entries().into_iter().map(|(k, _)| k).collect();
        assert!(keys.contains(&"rules.multiplier_step".to_string()));
        assert!(keys.contains(&"notifications.ttl_ms".to_string()));
        assert!(keys.contains(&"storage.state_file".to_string()));
    }

    #[test]
    fn load_from_writes_defaults_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        std::fs::write(&path, "[rules]\nmin_multiplier = 3.0\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn disabled_notifications_give_a_disabled_queue() {
        let mut cfg = Config::default();
        cfg.notifications.enabled = false;
        let mut queue = cfg.notification_queue();
        let now = chrono::NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert!(queue
            .push(crate::notifications::NotificationKind::Level, "x", now)
            .is_none());
    }
}
