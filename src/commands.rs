//! Line-mode command handlers

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local};
use rpassword::read_password;
use std::io::{self, IsTerminal, Write};

use crate::profile::{EnvKey, Profile};
use crate::store::validate_profile_name;
use crate::switch::Switcher;

/// Prompt user for input
fn prompt_input(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Prompt user for password input (hidden when attached to a terminal)
fn prompt_password(prompt: &str) -> Result<String> {
    if !io::stdin().is_terminal() {
        return prompt_input(prompt);
    }
    print!("{}", prompt);
    io::stdout().flush()?;
    let password = read_password()?;
    Ok(password.trim().to_string())
}

/// Parse `KEY=VALUE` pairs given with `--env`.
///
/// Pairs naming unknown keys or missing `=` are reported and skipped.
pub fn parse_env_pairs(pairs: &[String]) -> (Profile, Vec<String>) {
    let mut profile = Profile::new();
    let mut warnings = Vec::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            warnings.push(format!(
                "ignoring invalid env format '{}' (expected KEY=VALUE)",
                pair
            ));
            continue;
        };
        match key.trim().parse::<EnvKey>() {
            Ok(key) if !value.trim().is_empty() => profile.set_env(key, value.trim()),
            Ok(_) => warnings.push(format!("ignoring empty value for '{}'", key.trim())),
            Err(e) => warnings.push(format!("ignoring {}", e)),
        }
    }
    (profile, warnings)
}

/// Add a profile interactively
pub fn add_profile_interactive(switcher: &Switcher, name: &str, env_vars: &[String]) -> Result<()> {
    validate_profile_name(name)?;
    let mut store = switcher.load_store().context("loading profiles")?;
    if store.contains(name) {
        bail!("Profile '{}' already exists", name);
    }

    let (mut profile, warnings) = parse_env_pairs(env_vars);
    for warning in warnings {
        println!("Warning: {}", warning);
    }

    println!("Adding profile '{}' - press Enter to skip a value:", name);
    for key in EnvKey::ALL {
        if profile.get_env(key).is_some() {
            continue;
        }
        let prompt = format!("{} ({}): ", key.as_str(), key.label());
        let value = if key.is_secret() {
            prompt_password(&prompt)?
        } else {
            prompt_input(&prompt)?
        };
        if !value.is_empty() {
            profile.set_env(key, value);
        }
    }

    switcher.add(&mut store, name, profile)?;
    println!("✓ Profile '{}' added successfully", name);
    if store.current() == Some(name) {
        println!(
            "  It is now the active profile; run 'ccs use {}' to write it to Claude settings.",
            name
        );
    }
    Ok(())
}

/// List all profiles
pub fn list_profiles(switcher: &Switcher) -> Result<()> {
    let store = switcher.load_store().context("loading profiles")?;
    let names = store.profile_names();
    if names.is_empty() {
        println!("No profiles found. Use 'ccs add <name>' to create one.");
        return Ok(());
    }

    println!("Profiles:");
    for name in names {
        if store.current() == Some(name.as_str()) {
            println!("  {} (active)", name);
        } else {
            println!("  {}", name);
        }
    }
    Ok(())
}

/// Render a profile as aligned `label  value` lines
pub fn profile_lines(profile: &Profile, reveal: bool) -> Vec<String> {
    EnvKey::ALL
        .into_iter()
        .filter_map(|key| {
            let value = if reveal {
                profile.get_env(key).map(str::to_string)
            } else {
                profile.display_value(key)
            }?;
            Some(format!("{:<15}{}", key.label(), value))
        })
        .collect()
}

/// Show a profile's content
pub fn show_profile(switcher: &Switcher, name: &str, reveal: bool) -> Result<()> {
    let store = switcher.load_store().context("loading profiles")?;
    let profile = store.get_profile(name)?;
    let marker = if store.current() == Some(name) {
        " (active)"
    } else {
        ""
    };
    println!("Profile '{}'{}:", name, marker);
    for line in profile_lines(profile, reveal) {
        println!("  {}", line);
    }
    Ok(())
}

/// Remove a profile
pub fn remove_profile(switcher: &Switcher, name: &str) -> Result<()> {
    let mut store = switcher.load_store().context("loading profiles")?;
    let was_current = store.current() == Some(name);
    let outcome = switcher.remove(&mut store, name)?;

    if let Some(e) = outcome.clear_error {
        eprintln!("Warning: could not clear '{}' from Claude settings: {}", name, e);
    }
    if let Some(e) = &outcome.apply_error {
        eprintln!(
            "Warning: could not write the new active profile to Claude settings: {}",
            e
        );
    }
    println!("Profile '{}' removed successfully.", name);
    if was_current {
        match outcome.new_current {
            Some(next) => println!("Active profile is now '{}'.", next),
            None => println!("No profiles left; no profile is active."),
        }
    }
    Ok(())
}

/// Switch to a profile
pub fn switch_to_profile(switcher: &Switcher, name: &str) -> Result<()> {
    let mut store = switcher.load_store().context("loading profiles")?;
    let outcome = switcher
        .switch_to(&mut store, name)
        .with_context(|| format!("switching to profile '{}'", name))?;

    if let Some(e) = outcome.clear_error {
        eprintln!("Warning: could not clear previous profile: {}", e);
    }
    if let Some(e) = outcome.onboarding_error {
        eprintln!("Warning: failed to set onboarding flag: {}", e);
    } else if outcome.onboarding_set {
        println!("Onboarding flag set: first-time setup will be skipped.");
    }

    println!(
        "Switched to profile '{}' (wrote to {})",
        name,
        switcher.sync().path().display()
    );
    println!("Restart your terminal or Claude Code to apply changes.");
    Ok(())
}

/// Rename a profile from original name to new name
pub fn rename_profile(switcher: &Switcher, origin: &str, new: &str) -> Result<()> {
    let mut store = switcher.load_store().context("loading profiles")?;
    switcher.rename(&mut store, origin, new)?;
    println!("✓ Profile '{}' renamed to '{}' successfully", origin, new);
    Ok(())
}

/// Set or remove a single variable of a profile
pub fn edit_profile_value(
    switcher: &Switcher,
    name: &str,
    key: &str,
    value: Option<&str>,
) -> Result<()> {
    let key: EnvKey = key.parse()?;
    let mut store = switcher.load_store().context("loading profiles")?;
    let mut profile = store.get_profile(name)?.clone();

    match value {
        Some(value) => profile.set_env(key, value),
        None => {
            if profile.remove_env(key).is_none() {
                println!("Profile '{}' has no {}", name, key);
                return Ok(());
            }
        }
    }

    let outcome = switcher.update_profile(&mut store, name, profile)?;
    if let Some(e) = outcome.clear_error {
        eprintln!("Warning: could not clear old values from Claude settings: {}", e);
    }
    match value {
        Some(_) => println!("✓ Set {} for profile '{}'", key, name),
        None => println!("✓ Removed {} from profile '{}'", key, name),
    }
    Ok(())
}

/// Import current Claude settings as a new profile
pub fn import_current_profile(switcher: &Switcher, name: &str) -> Result<()> {
    let mut store = switcher.load_store().context("loading profiles")?;
    let profile = switcher.import_current(&mut store, name)?;
    println!(
        "✓ Imported {} value(s) from {} into profile '{}'",
        profile.len(),
        switcher.sync().path().display(),
        name
    );
    Ok(())
}

/// Print the active profile
pub fn show_current(switcher: &Switcher) -> Result<()> {
    let store = switcher.load_store().context("loading profiles")?;
    match store.current() {
        Some(name) => println!("{}", name),
        None => println!("No profile is active. Use 'ccs use <name>' to pick one."),
    }
    Ok(())
}

/// List settings backups
pub fn list_backups(switcher: &Switcher) -> Result<()> {
    let backups = switcher.sync().backups();
    let entries = backups.list()?;
    if entries.is_empty() {
        println!("No backups in {}", backups.dir().display());
        return Ok(());
    }

    println!("Backups in {} (keeping {}):", backups.dir().display(), backups.keep());
    for entry in entries {
        let when: DateTime<Local> = entry.modified.into();
        println!(
            "  {}  {}  {} bytes",
            when.format("%Y-%m-%d %H:%M:%S"),
            entry.file_name(),
            entry.size
        );
    }
    Ok(())
}
