use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};

use crate::config::ReminderConfig;
use crate::models::TargetList;

const SETTINGS_FILE: &str = "settings.json";

/// Contents of `settings.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserSettings {
    /// Executable names to monitor, in the order the user picked them.
    #[serde(alias = "selected_programs")]
    pub target_programs: Vec<String>,
    pub reminder: ReminderConfig,
}

impl UserSettings {
    pub fn targets(&self) -> TargetList {
        TargetList::from_names(&self.target_programs)
    }
}

/// File-backed settings. Every mutation is validated and written through.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    /// Platform settings location, e.g. `~/.config/saveguard/settings.json`.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("io", "saveguard", "SaveGuard")
            .context("Could not determine a home directory for settings")?;
        Ok(dirs.config_dir().join(SETTINGS_FILE))
    }

    /// Loads `path`. A missing or unparsable file yields defaults; a file
    /// that parses but holds out-of-range values is an error.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            parse_or_default(&contents, &path)
        } else {
            UserSettings::default()
        };

        data.reminder
            .validate()
            .with_context(|| format!("Invalid settings in {}", path.display()))?;

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> UserSettings {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn reminder(&self) -> ReminderConfig {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .reminder
            .clone()
    }

    pub fn update_reminder(&self, reminder: ReminderConfig) -> Result<()> {
        reminder.validate()?;
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        guard.reminder = reminder;
        self.persist(&guard)
    }

    /// Replaces the selection. Blank and duplicate names are dropped.
    pub fn set_target_programs<I, S>(&self, programs: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        guard.target_programs = TargetList::from_names(programs).names();
        self.persist(&guard)
    }

    /// Appends programs not already selected; returns how many were new.
    pub fn add_target_programs<I, S>(&self, programs: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        let mut targets = TargetList::from_names(&guard.target_programs);
        let added = programs
            .into_iter()
            .filter(|name| targets.add(name.as_ref()))
            .count();
        if added > 0 {
            guard.target_programs = targets.names();
            self.persist(&guard)?;
        }
        Ok(added)
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let data: UserSettings = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings in {}", self.path.display()))?;
        data.reminder.validate()?;
        *self.data.write().unwrap_or_else(PoisonError::into_inner) = data;
        Ok(())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

fn parse_or_default(contents: &str, path: &Path) -> UserSettings {
    match serde_json::from_str(contents) {
        Ok(data) => data,
        Err(err) => {
            log::warn!(
                "Ignoring unreadable settings in {} ({err}); using defaults",
                path.display()
            );
            UserSettings::default()
        }
    }
}
