use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::ConfigError;

pub const MIN_INTERVAL_SECS: u64 = 10;
pub const MAX_INTERVAL_SECS: u64 = 3600;
pub const MIN_BUBBLE_MS: u64 = 1000;
pub const MAX_BUBBLE_MS: u64 = 10_000;

/// Language codes accepted in the settings file, with their native names.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("en_US", "English"),
    ("zh_CN", "简体中文"),
    ("ja_JP", "日本語"),
    ("ko_KR", "한국어"),
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyMode {
    /// One reminder per running instance.
    Once,
    /// A reminder every interval until the program exits.
    Repeat,
}

impl Default for FrequencyMode {
    fn default() -> Self {
        FrequencyMode::Repeat
    }
}

/// Reminder settings as read by the scheduler and the focus correlator.
///
/// Aliases accept the key names written by earlier releases of the settings
/// file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReminderConfig {
    pub interval_seconds: u64,
    pub sound_enabled: bool,
    #[serde(alias = "bubble_duration")]
    pub bubble_duration_ms: u64,
    #[serde(alias = "remind_frequency")]
    pub frequency: FrequencyMode,
    pub focus_auto_save_enabled: bool,
    #[serde(alias = "hourly_remind_enabled")]
    pub hourly_reminder_enabled: bool,
    pub welcome_message_enabled: bool,
    pub auto_select_apps: bool,
    pub language: String,
    /// User overrides keyed by category (`code`, `document`, `design`,
    /// `browser`, `default`) or by `welcome` / `hourly`.
    #[serde(alias = "remind_messages")]
    pub messages: BTreeMap<String, String>,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 300,
            sound_enabled: true,
            bubble_duration_ms: 5000,
            frequency: FrequencyMode::Repeat,
            focus_auto_save_enabled: false,
            hourly_reminder_enabled: false,
            welcome_message_enabled: true,
            auto_select_apps: true,
            language: "en_US".into(),
            messages: BTreeMap::new(),
        }
    }
}

impl ReminderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS).contains(&self.interval_seconds) {
            return Err(ConfigError::InvalidInput {
                field: "interval_seconds",
                reason: format!(
                    "{} is outside {MIN_INTERVAL_SECS}..={MAX_INTERVAL_SECS}",
                    self.interval_seconds
                ),
            });
        }

        if !(MIN_BUBBLE_MS..=MAX_BUBBLE_MS).contains(&self.bubble_duration_ms) {
            return Err(ConfigError::InvalidInput {
                field: "bubble_duration_ms",
                reason: format!(
                    "{} is outside {MIN_BUBBLE_MS}..={MAX_BUBBLE_MS}",
                    self.bubble_duration_ms
                ),
            });
        }

        if !SUPPORTED_LANGUAGES
            .iter()
            .any(|(code, _)| *code == self.language)
        {
            return Err(ConfigError::UnsupportedLanguage(self.language.clone()));
        }

        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    pub fn bubble_duration(&self) -> Duration {
        Duration::from_millis(self.bubble_duration_ms)
    }

    /// Non-blank user override for a template key.
    pub fn message_override(&self, key: &str) -> Option<&str> {
        self.messages
            .get(key)
            .map(String::as_str)
            .filter(|text| !text.trim().is_empty())
    }
}
