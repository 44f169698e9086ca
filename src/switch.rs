//! Store mutations that also have to be reflected in Claude's settings.
//!
//! Each operation works on an already loaded [`ProfileStore`] and saves it
//! at the end, so the CLI and the TUI share one protocol.

use std::path::PathBuf;

use crate::backup::{Backups, DEFAULT_KEEP};
use crate::config::Paths;
use crate::error::{Error, Result};
use crate::onboarding::set_has_completed_onboarding;
use crate::profile::Profile;
use crate::settings::SettingsSync;
use crate::store::ProfileStore;

/// What happened during a switch besides the switch itself
#[derive(Debug, Default)]
pub struct SwitchOutcome {
    /// Profile that was active before, if it differed from the new one
    pub previous: Option<String>,
    /// Clearing the previous profile failed; the switch went ahead anyway
    pub clear_error: Option<Error>,
    /// The onboarding flag was newly set
    pub onboarding_set: bool,
    /// Setting the onboarding flag failed; not fatal
    pub onboarding_error: Option<Error>,
}

/// Result of removing a profile
#[derive(Debug, Default)]
pub struct RemoveOutcome {
    /// Profile that is active after the removal
    pub new_current: Option<String>,
    /// Clearing the removed profile's variables failed
    pub clear_error: Option<Error>,
    /// Writing the new active profile into Claude's settings failed
    pub apply_error: Option<Error>,
}

/// Result of replacing a profile's contents
#[derive(Debug, Default)]
pub struct UpdateOutcome {
    /// Clearing the old values from Claude's settings failed
    pub clear_error: Option<Error>,
}

/// Binds the store file, the settings sync and the onboarding document
#[derive(Debug, Clone)]
pub struct Switcher {
    profiles_file: PathBuf,
    claude_json: PathBuf,
    sync: SettingsSync,
}

impl Switcher {
    pub fn new(paths: &Paths) -> Self {
        Self {
            profiles_file: paths.profiles_file.clone(),
            claude_json: paths.claude_json.clone(),
            sync: SettingsSync::new(
                paths.claude_settings.clone(),
                Backups::new(paths.backup_dir.clone(), DEFAULT_KEEP),
            ),
        }
    }

    pub fn sync(&self) -> &SettingsSync {
        &self.sync
    }

    pub fn load_store(&self) -> Result<ProfileStore> {
        ProfileStore::load(&self.profiles_file)
    }

    pub fn save_store(&self, store: &ProfileStore) -> Result<()> {
        store.save(&self.profiles_file)
    }

    /// Apply `change` to a copy of the store and save it. `store` only
    /// takes the new state once it is on disk.
    fn commit<T>(
        &self,
        store: &mut ProfileStore,
        change: impl FnOnce(&mut ProfileStore) -> Result<T>,
    ) -> Result<T> {
        let mut next = store.clone();
        let value = change(&mut next)?;
        self.save_store(&next)?;
        *store = next;
        Ok(value)
    }

    /// Add a profile and persist the store
    pub fn add(&self, store: &mut ProfileStore, name: &str, profile: Profile) -> Result<()> {
        self.commit(store, |s| s.add_profile(name, profile))
    }

    /// Make `name` the active profile.
    ///
    /// The previously active profile's variables are cleared first; a
    /// failure there is reported but does not stop the switch. If applying
    /// the new profile or saving the store fails, the store is left as it
    /// was.
    pub fn switch_to(&self, store: &mut ProfileStore, name: &str) -> Result<SwitchOutcome> {
        let profile = store.get_profile(name)?.clone();
        let mut outcome = SwitchOutcome::default();

        if let Some(previous) = store.current().filter(|c| *c != name) {
            outcome.previous = Some(previous.to_string());
            if let Some(old) = store.current_profile()
                && let Err(e) = self.sync.clear(old)
            {
                tracing::warn!(profile = previous, error = %e, "failed to clear previous profile");
                outcome.clear_error = Some(e);
            }
        }

        self.sync.apply(&profile)?;

        match set_has_completed_onboarding(&self.claude_json) {
            Ok(changed) => outcome.onboarding_set = changed,
            Err(e) => {
                tracing::warn!(error = %e, "failed to set onboarding flag");
                outcome.onboarding_error = Some(e);
            }
        }

        self.commit(store, |s| s.set_current(name))?;
        tracing::info!(profile = name, "switched profile");
        Ok(outcome)
    }

    /// Remove a profile.
    ///
    /// The store is saved first; only then are Claude's settings brought in
    /// line. When the active profile goes away its variables are cleared
    /// and the profile inheriting the active marker is applied. Failures in
    /// that second step are reported in the outcome, the removal stands.
    pub fn remove(&self, store: &mut ProfileStore, name: &str) -> Result<RemoveOutcome> {
        let was_current = store.current() == Some(name);
        let removed = self.commit(store, |s| s.remove_profile(name))?;
        let mut outcome = RemoveOutcome {
            new_current: store.current().map(str::to_string),
            ..RemoveOutcome::default()
        };

        if was_current {
            if let Err(e) = self.sync.clear(&removed) {
                tracing::warn!(profile = name, error = %e, "failed to clear removed profile");
                outcome.clear_error = Some(e);
            }
            if let Some(next) = store.current_profile()
                && let Err(e) = self.sync.apply(next)
            {
                tracing::warn!(
                    profile = ?store.current(),
                    error = %e,
                    "failed to apply new active profile"
                );
                outcome.apply_error = Some(e);
            }
        }

        tracing::info!(profile = name, "removed profile");
        Ok(outcome)
    }

    /// Rename a profile and persist the store
    pub fn rename(&self, store: &mut ProfileStore, old: &str, new: &str) -> Result<()> {
        self.commit(store, |s| s.rename_profile(old, new))
    }

    /// Replace a profile's contents and persist the store. If it is active,
    /// Claude's settings are updated too: old variables cleared (best
    /// effort, reported in the outcome), new ones applied.
    pub fn update_profile(
        &self,
        store: &mut ProfileStore,
        name: &str,
        profile: Profile,
    ) -> Result<UpdateOutcome> {
        let old = self.commit(store, |s| s.replace_profile(name, profile))?;
        let mut outcome = UpdateOutcome::default();

        if store.current() == Some(name) {
            if let Err(e) = self.sync.clear(&old) {
                tracing::warn!(profile = name, error = %e, "failed to clear old profile values");
                outcome.clear_error = Some(e);
            }
            self.sync.apply(store.get_profile(name)?)?;
        }

        Ok(outcome)
    }

    /// Create a profile from the recognized variables currently present in
    /// Claude's settings file
    pub fn import_current(&self, store: &mut ProfileStore, name: &str) -> Result<Profile> {
        let settings = self.sync.read()?;
        let profile = settings
            .env
            .as_ref()
            .map(Profile::from_settings_env)
            .unwrap_or_default();
        if profile.is_empty() {
            return Err(Error::Validation(format!(
                "no Claude Code profile variables found in {}",
                self.sync.path().display()
            )));
        }

        self.add(store, name, profile.clone())?;
        Ok(profile)
    }
}
