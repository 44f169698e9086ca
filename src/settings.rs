//! Applying and clearing profile variables in Claude Code's settings.json

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::backup::Backups;
use crate::error::{Error, Result};
use crate::fsutil::write_json_atomic;
use crate::profile::Profile;

/// Claude Code's settings document.
///
/// Only `env` is interpreted; every other top-level field is carried
/// through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaudeSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl ClaudeSettings {
    pub fn env_mut(&mut self) -> &mut Map<String, Value> {
        self.env.get_or_insert_with(Map::new)
    }
}

/// Keeps Claude's settings file in step with the active profile
#[derive(Debug, Clone)]
pub struct SettingsSync {
    path: PathBuf,
    backups: Backups,
}

impl SettingsSync {
    pub fn new(path: impl Into<PathBuf>, backups: Backups) -> Self {
        Self {
            path: path.into(),
            backups,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backups(&self) -> &Backups {
        &self.backups
    }

    /// Write the profile's variables into the settings file.
    ///
    /// The existing file is backed up first. If it cannot be parsed it is
    /// replaced by a fresh document; the backup still holds the old bytes.
    pub fn apply(&self, profile: &Profile) -> Result<()> {
        self.backups.snapshot(&self.path)?;

        let mut settings = match self.read_text()? {
            None => ClaudeSettings::default(),
            Some(text) => match serde_json::from_str(&text) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "settings file is not valid JSON, starting from an empty document"
                    );
                    ClaudeSettings::default()
                }
            },
        };

        let env = settings.env_mut();
        for (key, value) in profile.iter() {
            env.insert(key.as_str().to_string(), Value::String(value.to_string()));
        }

        write_json_atomic(&self.path, &settings)?;
        tracing::debug!(path = %self.path.display(), keys = profile.len(), "applied profile");
        Ok(())
    }

    /// Remove exactly the profile's variables from the settings file.
    ///
    /// A missing file is fine; an unparseable one is an error and is left
    /// as it is.
    pub fn clear(&self, profile: &Profile) -> Result<()> {
        let Some(text) = self.read_text()? else {
            return Ok(());
        };
        let mut settings: ClaudeSettings =
            serde_json::from_str(&text).map_err(|e| Error::parse(&self.path, e))?;

        let Some(env) = settings.env.as_mut() else {
            return Ok(());
        };
        let removed = profile
            .keys()
            .filter(|key| env.remove(key.as_str()).is_some())
            .count();
        if removed == 0 {
            return Ok(());
        }

        write_json_atomic(&self.path, &settings)?;
        tracing::debug!(path = %self.path.display(), removed, "cleared profile");
        Ok(())
    }

    /// The current settings document; empty when the file does not exist
    pub fn read(&self) -> Result<ClaudeSettings> {
        match self.read_text()? {
            None => Ok(ClaudeSettings::default()),
            Some(text) => serde_json::from_str(&text).map_err(|e| Error::parse(&self.path, e)),
        }
    }

    fn read_text(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(&self.path, e)),
        }
    }
}
