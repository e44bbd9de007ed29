//! TOML-based application configuration.
//!
//! Stores the settings the engine is driven with:
//! - Consumption profile (cost, frequency, session hours)
//! - Unit mode for new attempts (real days or accelerated test modes)
//! - Optional fixed time zone offset for statistics periods
//!
//! Configuration is stored at `~/.config/dryspell/config.toml`.

use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::ConfigError;
use crate::stats::ConsumptionProfile;
use crate::units::UnitMode;

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/dryspell/config.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Unit mode applied to newly started attempts.
    #[serde(default)]
    pub unit_mode: UnitMode,
    /// Fixed UTC offset for period boundaries; local time when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone_offset_minutes: Option<i32>,
    #[serde(default)]
    pub profile: ConsumptionProfile,
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
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) | serde_json::Value::Null => {
                        parse_number(value).ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    serde_json::Value::String(_) => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Keys accepted by [`get`](Self::get) and [`set`](Self::set).
    pub fn keys() -> &'static [&'static str] {
        &[
            "profile.unit_cost",
            "profile.weekly_frequency",
            "profile.session_hours",
            "unit_mode",
            "time_zone_offset_minutes",
        ]
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
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
                tracing::debug!("No config at {}, writing defaults", path.display());
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
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

    /// Set a config value by key, validating the result. Does not save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// or is out of range.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        if key == "time_zone_offset_minutes" {
            // Absent from the serialized form when unset.
            if let Some(obj) = json.as_object_mut() {
                obj.entry(key).or_insert(serde_json::Value::Null);
            }
        }
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.profile
            .validate()
            .map_err(|message| ConfigError::InvalidValue {
                key: "profile".into(),
                message,
            })?;
        if let Some(minutes) = self.time_zone_offset_minutes {
            if self.time_zone().is_none() {
                return Err(ConfigError::InvalidValue {
                    key: "time_zone_offset_minutes".into(),
                    message: format!("offset {minutes} is out of range"),
                });
            }
        }
        Ok(())
    }

    /// Configured fixed offset, if any.
    pub fn time_zone(&self) -> Option<FixedOffset> {
        let minutes = self.time_zone_offset_minutes?;
        FixedOffset::east_opt(minutes.checked_mul(60)?)
    }
}

fn parse_number(value: &str) -> Option<serde_json::Value> {
    if let Ok(n) = value.parse::<i64>() {
        return Some(serde_json::Value::Number(n.into()));
    }
    let f = value.parse::<f64>().ok()?;
    serde_json::Number::from_f64(f).map(serde_json::Value::Number)
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
        assert_eq!(parsed.profile.unit_cost, 40_000.0);
        assert_eq!(parsed.unit_mode, UnitMode::Day);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("unit_mode = \"minute\"\n[profile]\nunit_cost = 12000.0\n").unwrap();
        assert_eq!(parsed.unit_mode, UnitMode::Minute);
        assert_eq!(parsed.profile.unit_cost, 12_000.0);
        assert_eq!(parsed.profile.weekly_frequency, 2.5);
        assert!(parsed.time_zone().is_none());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("profile.weekly_frequency").as_deref(), Some("2.5"));
        assert_eq!(cfg.get("unit_mode").as_deref(), Some("day"));
        assert!(cfg.get("profile.missing_key").is_none());
    }

    #[test]
    fn set_updates_number_and_enum() {
        let mut cfg = Config::default();
        cfg.set("profile.unit_cost", "70000").unwrap();
        cfg.set("profile.session_hours", "1.5").unwrap();
        cfg.set("unit_mode", "second").unwrap();
        assert_eq!(cfg.profile.unit_cost, 70_000.0);
        assert_eq!(cfg.profile.session_hours, 1.5);
        assert_eq!(cfg.unit_mode, UnitMode::Second);
    }

    #[test]
    fn set_time_zone_offset() {
        let mut cfg = Config::default();
        cfg.set("time_zone_offset_minutes", "540").unwrap();
        assert_eq!(cfg.time_zone(), FixedOffset::east_opt(9 * 3600));
        cfg.set("time_zone_offset_minutes", "-300").unwrap();
        assert_eq!(cfg.time_zone(), FixedOffset::east_opt(-5 * 3600));
        assert!(cfg.set("time_zone_offset_minutes", "100000").is_err());
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_values() {
        let mut cfg = Config::default();
        assert!(matches!(cfg.set("nope", "1"), Err(ConfigError::UnknownKey(_))));
        assert!(matches!(
            cfg.set("profile.unit_cost", "lots"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(cfg.set("profile.unit_cost", "-5").is_err());
        assert!(cfg.set("unit_mode", "fortnight").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_from_writes_defaults_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.set("profile.weekly_frequency", "5").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().profile.weekly_frequency, 5.0);
    }

    #[test]
    fn load_from_reports_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "unit_mode = 12").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::LoadFailed { .. })));
    }
}
