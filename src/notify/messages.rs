use crate::config::ReminderConfig;
use crate::models::TargetProgram;

use super::i18n::fill;
use super::Translator;

/// Builds bubble text from user overrides first, translations second.
pub struct MessageComposer<'a> {
    config: &'a ReminderConfig,
    translator: &'a dyn Translator,
}

impl<'a> MessageComposer<'a> {
    pub fn new(config: &'a ReminderConfig, translator: &'a dyn Translator) -> Self {
        Self { config, translator }
    }

    /// Two lines: how long the program has been running, then the category
    /// template.
    pub fn reminder(&self, program: &TargetProgram) -> String {
        let category = program.category;
        let body = match self
            .config
            .message_override(category.as_str())
            .or_else(|| self.config.message_override("default"))
        {
            Some(text) => text.to_string(),
            None => self.translator.translate("messages", Some(category)),
        };

        let seconds = self.config.interval_seconds;
        let name = program.display_name.as_str();
        let header = if seconds >= 60 {
            let minutes = (seconds / 60).to_string();
            fill(
                &self.translator.translate("bubble.running_for_minutes", None),
                &[("program", name), ("minutes", minutes.as_str())],
            )
        } else {
            let seconds = seconds.to_string();
            fill(
                &self.translator.translate("bubble.running_for_seconds", None),
                &[("program", name), ("seconds", seconds.as_str())],
            )
        };

        format!("{header}\n{body}")
    }

    pub fn welcome(&self, program: &TargetProgram) -> String {
        fill(
            &self.template("welcome", "messages.welcome"),
            &[("program", program.display_name.as_str())],
        )
    }

    /// Summary for programs found already running at startup.
    pub fn startup(&self, programs: &[String]) -> String {
        let key = if programs.len() == 1 {
            "bubble.startup_single"
        } else {
            "bubble.startup_many"
        };
        let joined = programs.join(", ");
        fill(
            &self.translator.translate(key, None),
            &[("programs", joined.as_str())],
        )
    }

    pub fn hourly(&self, hour: u32) -> String {
        let hour = hour.to_string();
        fill(
            &self.template("hourly", "messages.hourly"),
            &[("hour", hour.as_str())],
        )
    }

    fn template(&self, override_key: &str, translation_key: &str) -> String {
        self.config
            .message_override(override_key)
            .map(str::to_string)
            .unwrap_or_else(|| self.translator.translate(translation_key, None))
    }
}
