//! Marks Claude Code's first-run setup as done in `~/.claude.json`

use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Error, Result};
use crate::fsutil::write_json_atomic;

pub const ONBOARDING_FLAG: &str = "hasCompletedOnboarding";

/// Set `hasCompletedOnboarding` to true.
///
/// Returns `false` without touching the file when the flag is already set.
/// A missing file counts as an empty document. A malformed one is an
/// error: the file holds other state that must not be thrown away.
pub fn set_has_completed_onboarding(path: &Path) -> Result<bool> {
    let mut doc = match fs::read_to_string(path) {
        Ok(text) => parse_object(path, &text)?,
        Err(e) if e.kind() == ErrorKind::NotFound => Map::new(),
        Err(e) => return Err(Error::io(path, e)),
    };

    if doc.get(ONBOARDING_FLAG) == Some(&Value::Bool(true)) {
        return Ok(false);
    }

    doc.insert(ONBOARDING_FLAG.to_string(), Value::Bool(true));
    write_json_atomic(path, &doc)?;
    tracing::debug!(path = %path.display(), "set onboarding flag");
    Ok(true)
}

fn parse_object(path: &Path, text: &str) -> Result<Map<String, Value>> {
    // Decoding straight into a map also rejects arrays and scalars.
    serde_json::from_str(text).map_err(|e| Error::parse(path, e))
}
