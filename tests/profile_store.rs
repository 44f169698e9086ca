use anyhow::{Context, Result};
use ccs::Error;
use ccs::profile::Profile;
use ccs::store::ProfileStore;

fn token_profile(token: &str) -> Profile {
    let mut profile = Profile::new();
    profile.set_auth_token(token);
    profile
}

#[test]
fn store_lifecycle_survives_reload() -> Result<()> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("nested").join("profiles.json");

    let mut store = ProfileStore::load(&path)?;
    assert!(store.is_empty());
    assert_eq!(store.current(), None);

    store.add_profile("work", token_profile("sk-work"))?;
    assert_eq!(store.current(), Some("work"));

    let err = store
        .add_profile("work", token_profile("sk-other"))
        .expect_err("duplicate name");
    assert!(matches!(err, Error::AlreadyExists { .. }));

    store.add_profile("personal", token_profile("sk-personal"))?;
    store.save(&path)?;

    let mut reloaded = ProfileStore::load(&path)?;
    assert_eq!(reloaded, store);
    assert_eq!(reloaded.profile_names(), vec!["personal", "work"]);

    reloaded.remove_profile("work")?;
    assert_eq!(reloaded.current(), Some("personal"));
    reloaded.remove_profile("personal")?;
    assert_eq!(reloaded.current(), None);
    reloaded.save(&path)?;

    let text = std::fs::read_to_string(&path)?;
    let doc: serde_json::Value = serde_json::from_str(&text)?;
    assert_eq!(doc["current"], "");
    assert_eq!(doc["profiles"], serde_json::json!({}));
    Ok(())
}

#[test]
fn rename_moves_active_marker() -> Result<()> {
    let mut store = ProfileStore::new();
    store.add_profile("a", token_profile("t1"))?;
    store.add_profile("b", token_profile("t2"))?;

    store.rename_profile("a", "c")?;
    assert_eq!(store.current(), Some("c"));
    assert_eq!(store.get_profile("c")?.auth_token(), Some("t1"));
    assert!(matches!(
        store.get_profile("a"),
        Err(Error::NotFound { .. })
    ));

    let err = store.rename_profile("c", "b").expect_err("target exists");
    assert_eq!(err.code(), "ALREADY_EXISTS");
    let err = store.rename_profile("c", "bad name").expect_err("invalid");
    assert_eq!(err.code(), "VALIDATION_ERROR");
    Ok(())
}

#[test]
fn tolerant_load_of_hand_edited_file() -> Result<()> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("profiles.json");
    std::fs::write(
        &path,
        r#"{
            "current": "gone",
            "profiles": {
                "x": { "env": { "ANTHROPIC_MODEL": "m", "API_TIMEOUT_MS": "1" } }
            }
        }"#,
    )?;

    let store = ProfileStore::load(&path)?;
    assert_eq!(store.current(), None);
    let profile = store.get_profile("x")?;
    assert_eq!(profile.len(), 1);
    assert_eq!(profile.model(), Some("m"));
    Ok(())
}

#[test]
fn corrupt_store_is_a_parse_error() -> Result<()> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("profiles.json");
    std::fs::write(&path, "{ not json")?;

    let err = ProfileStore::load(&path).expect_err("corrupt file");
    assert_eq!(err.code(), "PARSE_ERROR");
    Ok(())
}
