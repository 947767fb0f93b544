use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf, str::FromStr};
use thiserror::Error;

const APP_NAMESPACE: &str = "pet-me-js";
const STATE_FILE: &str = "state.json";

/// Simulation tuning stored alongside the pets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct Config {
    pub(crate) hunger_rate_per_hour: f64,
    pub(crate) happiness_decay_per_hour: f64,
    pub(crate) health_decay_per_hour: f64,
    /// Chance per `advance` call, not scaled by elapsed time.
    pub(crate) random_event_hourly_chance: f64,
    pub(crate) notifications: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hunger_rate_per_hour: 5.0,
            happiness_decay_per_hour: 3.0,
            health_decay_per_hour: 2.0,
            random_event_hourly_chance: 0.2,
            notifications: false,
        }
    }
}

impl Config {
    pub(crate) fn get(&self, key: ConfigKey) -> ConfigValue {
        match key {
            ConfigKey::HungerRatePerHour => ConfigValue::Number(self.hunger_rate_per_hour),
            ConfigKey::HappinessDecayPerHour => {
                ConfigValue::Number(self.happiness_decay_per_hour)
            }
            ConfigKey::HealthDecayPerHour => ConfigValue::Number(self.health_decay_per_hour),
            ConfigKey::RandomEventHourlyChance => {
                ConfigValue::Number(self.random_event_hourly_chance)
            }
            ConfigKey::Notifications => ConfigValue::Flag(self.notifications),
        }
    }

    fn slot(&mut self, key: ConfigKey) -> Slot<'_> {
        match key {
            ConfigKey::HungerRatePerHour => Slot::Number(&mut self.hunger_rate_per_hour),
            ConfigKey::HappinessDecayPerHour => Slot::Number(&mut self.happiness_decay_per_hour),
            ConfigKey::HealthDecayPerHour => Slot::Number(&mut self.health_decay_per_hour),
            ConfigKey::RandomEventHourlyChance => {
                Slot::Number(&mut self.random_event_hourly_chance)
            }
            ConfigKey::Notifications => Slot::Flag(&mut self.notifications),
        }
    }

    /// Parses `raw` as the field's own type and stores it.
    pub(crate) fn set(&mut self, key: ConfigKey, raw: &str) -> Result<ConfigValue, ConfigError> {
        match self.slot(key) {
            Slot::Number(field) => {
                *field = key.parse_number(raw)?;
                Ok(ConfigValue::Number(*field))
            }
            Slot::Flag(field) => {
                *field = key.parse_flag(raw)?;
                Ok(ConfigValue::Flag(*field))
            }
        }
    }
}

enum Slot<'a> {
    Number(&'a mut f64),
    Flag(&'a mut bool),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ConfigKind {
    Number,
    Flag,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ConfigKey {
    HungerRatePerHour,
    HappinessDecayPerHour,
    HealthDecayPerHour,
    RandomEventHourlyChance,
    Notifications,
}

impl ConfigKey {
    pub(crate) const ALL: [ConfigKey; 5] = [
        ConfigKey::HungerRatePerHour,
        ConfigKey::HappinessDecayPerHour,
        ConfigKey::HealthDecayPerHour,
        ConfigKey::RandomEventHourlyChance,
        ConfigKey::Notifications,
    ];

    /// Name used in the state file and on the command line.
    pub(crate) fn wire_name(self) -> &'static str {
        match self {
            ConfigKey::HungerRatePerHour => "hungerRatePerHour",
            ConfigKey::HappinessDecayPerHour => "happinessDecayPerHour",
            ConfigKey::HealthDecayPerHour => "healthDecayPerHour",
            ConfigKey::RandomEventHourlyChance => "randomEventHourlyChance",
            ConfigKey::Notifications => "notifications",
        }
    }

    pub(crate) fn kind(self) -> ConfigKind {
        match self {
            ConfigKey::Notifications => ConfigKind::Flag,
            _ => ConfigKind::Number,
        }
    }

    pub(crate) fn parse_value(self, raw: &str) -> Result<ConfigValue, ConfigError> {
        match self.kind() {
            ConfigKind::Flag => self.parse_flag(raw).map(ConfigValue::Flag),
            ConfigKind::Number => self.parse_number(raw).map(ConfigValue::Number),
        }
    }

    fn parse_flag(self, raw: &str) -> Result<bool, ConfigError> {
        match raw.trim() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(ConfigError::InvalidFlag {
                key: self,
                value: raw.to_string(),
            }),
        }
    }

    /// Finite numbers only.
    fn parse_number(self, raw: &str) -> Result<f64, ConfigError> {
        match raw.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(n),
            _ => Err(ConfigError::InvalidNumber {
                key: self,
                value: raw.to_string(),
            }),
        }
    }

    pub(crate) fn names() -> String {
        Self::ALL
            .iter()
            .map(|k| k.wire_name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    /// Accepts camelCase, snake_case and kebab-case spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.wire_name().to_ascii_lowercase() == folded)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum ConfigValue {
    Number(f64),
    Flag(bool),
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Number(n) => write!(f, "{n}"),
            ConfigValue::Flag(b) => write!(f, "{b}"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub(crate) enum ConfigError {
    #[error("unknown config key `{0}`")]
    UnknownKey(String),
    #[error("{key} expects a number (got `{value}`)")]
    InvalidNumber { key: ConfigKey, value: String },
    #[error("{key} expects true or false (got `{value}`)")]
    InvalidFlag { key: ConfigKey, value: String },
}

/// Where the state file lives: an explicit override, else the per-user
/// config directory.
pub(crate) fn state_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    let proj = ProjectDirs::from("", "", APP_NAMESPACE)
        .context("could not resolve project directories")?;
    Ok(proj.config_dir().join(STATE_FILE))
}
