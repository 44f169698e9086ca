use anyhow::{Context, Result};
use ccs::backup::Backups;
use ccs::config::Paths;
use ccs::profile::Profile;
use ccs::store::ProfileStore;
use ccs::switch::Switcher;
use serde_json::{Value, json};
use std::fs;
use std::path::Path;

fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    Ok(serde_json::from_str(&text)?)
}

fn profile(token: &str, model: Option<&str>) -> Profile {
    let mut profile = Profile::new();
    profile.set_auth_token(token);
    if let Some(model) = model {
        profile.set_model(model);
    }
    profile
}

#[test]
fn switching_replaces_only_profile_keys() -> Result<()> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let paths = Paths::with_root(dir.path());
    let switcher = Switcher::new(&paths);

    fs::create_dir_all(dir.path().join(".claude"))?;
    fs::write(
        &paths.claude_settings,
        r#"{"env":{"KEEP":"1"},"theme":"dark"}"#,
    )?;

    let mut store = ProfileStore::new();
    switcher.add(&mut store, "a", profile("t1", Some("m1")))?;
    switcher.add(&mut store, "b", profile("t2", None))?;

    switcher.switch_to(&mut store, "a")?;
    let doc = read_json(&paths.claude_settings)?;
    assert_eq!(doc["theme"], "dark");
    assert_eq!(
        doc["env"],
        json!({"KEEP": "1", "ANTHROPIC_AUTH_TOKEN": "t1", "ANTHROPIC_MODEL": "m1"})
    );

    let outcome = switcher.switch_to(&mut store, "b")?;
    assert_eq!(outcome.previous.as_deref(), Some("a"));
    assert!(outcome.clear_error.is_none());
    let doc = read_json(&paths.claude_settings)?;
    assert_eq!(doc["env"], json!({"KEEP": "1", "ANTHROPIC_AUTH_TOKEN": "t2"}));
    assert_eq!(doc["theme"], "dark");

    let stored = ProfileStore::load(&paths.profiles_file)?;
    assert_eq!(stored.current(), Some("b"));

    let claude_json = read_json(&paths.claude_json)?;
    assert_eq!(claude_json["hasCompletedOnboarding"], true);
    Ok(())
}

#[test]
fn every_apply_is_backed_up_and_rotated() -> Result<()> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let paths = Paths::with_root(dir.path());
    let switcher = Switcher::new(&paths);

    let mut store = ProfileStore::new();
    switcher.add(&mut store, "a", profile("t1", None))?;
    switcher.add(&mut store, "b", profile("t2", None))?;

    // The first switch has no settings file to back up.
    switcher.switch_to(&mut store, "a")?;
    assert!(switcher.sync().backups().list()?.is_empty());

    for i in 0..7 {
        let name = if i % 2 == 0 { "b" } else { "a" };
        switcher.switch_to(&mut store, name)?;
    }

    let backups = switcher.sync().backups().list()?;
    assert_eq!(backups.len(), 5);
    for entry in &backups {
        let name = entry.file_name();
        assert!(name.starts_with("settings-") && name.ends_with(".json"));
        read_json(&entry.path)?;
    }
    Ok(())
}

#[test]
fn rotation_keeps_the_five_newest_snapshots() -> Result<()> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let source = dir.path().join("settings.json");
    let backups = Backups::new(dir.path().join("backups"), 5);

    let mut created = Vec::new();
    for i in 0..7 {
        fs::write(&source, format!("{{\"generation\": {}}}", i))?;
        let path = backups.snapshot(&source)?.context("source exists")?;
        created.push(path);
    }

    let kept: Vec<_> = backups.list()?.into_iter().map(|e| e.path).collect();
    let newest: Vec<_> = created[2..].iter().rev().cloned().collect();
    assert_eq!(kept, newest);
    for (entry, generation) in kept.iter().zip((2..7).rev()) {
        assert_eq!(read_json(entry)?["generation"], generation);
    }
    for old in &created[..2] {
        assert!(!old.exists());
    }
    Ok(())
}

#[test]
fn removing_active_profile_applies_successor() -> Result<()> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let paths = Paths::with_root(dir.path());
    let switcher = Switcher::new(&paths);

    let mut store = ProfileStore::new();
    switcher.add(&mut store, "a", profile("t1", Some("m1")))?;
    switcher.add(&mut store, "b", profile("t2", None))?;
    switcher.switch_to(&mut store, "a")?;

    let outcome = switcher.remove(&mut store, "a")?;
    assert_eq!(outcome.new_current.as_deref(), Some("b"));
    let doc = read_json(&paths.claude_settings)?;
    assert_eq!(doc["env"], json!({"ANTHROPIC_AUTH_TOKEN": "t2"}));

    let outcome = switcher.remove(&mut store, "b")?;
    assert_eq!(outcome.new_current, None);
    let doc = read_json(&paths.claude_settings)?;
    assert_eq!(doc["env"], json!({}));
    Ok(())
}

#[test]
fn import_reads_known_keys_from_settings() -> Result<()> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let paths = Paths::with_root(dir.path());
    let switcher = Switcher::new(&paths);

    fs::create_dir_all(dir.path().join(".claude"))?;
    fs::write(
        &paths.claude_settings,
        r#"{"env":{"ANTHROPIC_BASE_URL":"https://proxy","OTHER":"x","ANTHROPIC_MODEL":7}}"#,
    )?;

    let mut store = ProfileStore::new();
    let imported = switcher.import_current(&mut store, "proxy")?;
    assert_eq!(imported.len(), 1);
    assert_eq!(imported.base_url(), Some("https://proxy"));

    let stored = ProfileStore::load(&paths.profiles_file)?;
    assert_eq!(stored.current(), Some("proxy"));

    let mut empty = ProfileStore::new();
    fs::write(&paths.claude_settings, "{}")?;
    let err = switcher
        .import_current(&mut empty, "nothing")
        .expect_err("no variables to import");
    assert_eq!(err.code(), "VALIDATION_ERROR");
    Ok(())
}
