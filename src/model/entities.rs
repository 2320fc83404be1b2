use std::fmt::Display;

use chrono::NaiveTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::grid::{SlotClock, DEFAULT_DAY_START_HOUR};

use super::{CategoryId, EventId};

/// Top-level grouping of events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// The unit that gets written into slots. An event without a name tags the slot with its
/// category only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTag {
    pub id: EventId,
    pub category_id: CategoryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Fixed events are carried over when copying from the previous day.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fixed: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    System,
    Light,
    Dark,
}

impl ThemeMode {
    /// System appearance is not probed, so `System` renders like `Light`.
    pub fn is_dark(&self) -> bool {
        matches!(self, ThemeMode::Dark)
    }
}

impl Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThemeMode::System => write!(f, "system"),
            ThemeMode::Light => write!(f, "light"),
            ThemeMode::Dark => write!(f, "dark"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    #[serde(with = "clock_ser")]
    pub night_start: NaiveTime,
    #[serde(with = "clock_ser")]
    pub night_end: NaiveTime,
    pub theme_mode: ThemeMode,
    pub day_start_hour: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            night_start: NaiveTime::from_hms_opt(23, 0, 0).unwrap_or(NaiveTime::MIN),
            night_end: NaiveTime::from_hms_opt(7, 0, 0).unwrap_or(NaiveTime::MIN),
            theme_mode: ThemeMode::System,
            day_start_hour: DEFAULT_DAY_START_HOUR,
        }
    }
}

impl Settings {
    pub fn slot_clock(&self) -> SlotClock {
        SlotClock::new(self.day_start_hour)
    }
}

/// Stores times of day as `HH:MM`.
mod clock_ser {
    use chrono::NaiveTime;
    use serde::{self, de::Error, Deserialize, Deserializer, Serializer};

    use crate::grid::parse_clock;

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_clock(&s).map_err(D::Error::custom)
    }
}
