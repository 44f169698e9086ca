use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Error, Result};
use crate::fsutil::write_json_atomic;
use crate::profile::Profile;

/// All saved profiles plus the name of the active one.
///
/// `current` is empty when no profile is active; otherwise it always names
/// an entry of `profiles`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileStore {
    #[serde(default, deserialize_with = "null_as_default")]
    current: String,
    #[serde(default, deserialize_with = "null_as_default")]
    profiles: BTreeMap<String, Profile>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Check that a profile name is non-empty and only uses `[A-Za-z0-9_-]`
pub fn validate_profile_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation("profile name cannot be empty".to_string()));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(Error::Validation(format!(
            "invalid profile name '{}': only letters, numbers, hyphens, and underscores are allowed",
            name
        )));
    }
    Ok(())
}

fn ensure_not_empty(name: &str, profile: &Profile) -> Result<()> {
    if profile.is_empty() {
        return Err(Error::Validation(format!(
            "profile '{}' cannot be empty; provide at least one configuration value",
            name
        )));
    }
    Ok(())
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the store from `path`. A missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no profiles file yet");
                return Ok(Self::new());
            }
            Err(e) => return Err(Error::io(path, e)),
        };

        let mut store: Self = serde_json::from_str(&text).map_err(|e| Error::parse(path, e))?;
        if !store.current.is_empty() && !store.profiles.contains_key(&store.current) {
            tracing::warn!(
                current = %store.current,
                "active profile is missing from the store, clearing it"
            );
            store.current.clear();
        }
        Ok(store)
    }

    /// Write the whole store to `path` atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        write_json_atomic(path, self)
    }

    /// Insert a new profile. The first profile of an empty store becomes
    /// the active one.
    pub fn add_profile(&mut self, name: &str, profile: Profile) -> Result<()> {
        validate_profile_name(name)?;
        ensure_not_empty(name, &profile)?;
        if self.profiles.contains_key(name) {
            return Err(Error::AlreadyExists {
                name: name.to_string(),
            });
        }

        self.profiles.insert(name.to_string(), profile);
        if self.current.is_empty() {
            self.current = name.to_string();
        }
        Ok(())
    }

    /// Remove a profile and return it.
    ///
    /// Removing the active profile hands the marker to the alphabetically
    /// first remaining profile, or clears it when none is left.
    pub fn remove_profile(&mut self, name: &str) -> Result<Profile> {
        let removed = self
            .profiles
            .remove(name)
            .ok_or_else(|| Error::not_found(name))?;

        if self.current == name {
            self.current = self.profiles.keys().next().cloned().unwrap_or_default();
        }
        Ok(removed)
    }

    /// Move a profile to a new name, following the active marker
    pub fn rename_profile(&mut self, old: &str, new: &str) -> Result<()> {
        if !self.profiles.contains_key(old) {
            return Err(Error::not_found(old));
        }
        validate_profile_name(new)?;
        if self.profiles.contains_key(new) {
            return Err(Error::AlreadyExists {
                name: new.to_string(),
            });
        }

        if let Some(profile) = self.profiles.remove(old) {
            self.profiles.insert(new.to_string(), profile);
        }
        if self.current == old {
            self.current = new.to_string();
        }
        Ok(())
    }

    /// Replace the contents of an existing profile, returning the old ones
    pub fn replace_profile(&mut self, name: &str, profile: Profile) -> Result<Profile> {
        ensure_not_empty(name, &profile)?;
        let slot = self
            .profiles
            .get_mut(name)
            .ok_or_else(|| Error::not_found(name))?;
        Ok(std::mem::replace(slot, profile))
    }

    pub fn get_profile(&self, name: &str) -> Result<&Profile> {
        self.profiles.get(name).ok_or_else(|| Error::not_found(name))
    }

    pub fn set_current(&mut self, name: &str) -> Result<()> {
        if !self.profiles.contains_key(name) {
            return Err(Error::not_found(name));
        }
        self.current = name.to_string();
        Ok(())
    }

    /// Name of the active profile, if any
    pub fn current(&self) -> Option<&str> {
        if self.current.is_empty() {
            None
        } else {
            Some(&self.current)
        }
    }

    pub fn current_profile(&self) -> Option<&Profile> {
        self.current().and_then(|name| self.profiles.get(name))
    }

    /// Profile names in sorted order
    pub fn profile_names(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
