//! Atomic JSON file replacement

use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// Serialize `value` as pretty JSON and atomically replace `path` with it.
///
/// The bytes go to a temporary file in the same directory which is then
/// renamed over the destination, so readers see either the old or the new
/// file and never a partial write.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut data = serde_json::to_vec_pretty(value).map_err(|e| Error::parse(path, e))?;
    data.push(b'\n');
    write_atomic(path, &data)
}

/// Atomically replace `path` with `data`, creating parent directories
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

    // Dropping the temp file on an early return removes it.
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    tmp.write_all(data).map_err(|e| Error::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| Error::io(tmp.path(), e))?;

    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;
    tracing::debug!(path = %path.display(), bytes = data.len(), "wrote file atomically");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn creates_parent_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a").join("b").join("doc.json");

        write_json_atomic(&path, &json!({"k": "v"})).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "{\n  \"k\": \"v\"\n}\n");
    }

    #[test]
    fn replaces_existing_file_without_leftovers() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("doc.json");
        fs::write(&path, "old").unwrap();

        write_json_atomic(&path, &json!([1, 2])).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value, json!([1, 2]));

        let entries: Vec<_> = fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1, "temporary file must not survive");
    }

    #[test]
    fn failure_leaves_destination_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        // A directory at the destination makes the final rename fail.
        let path = tmp.path().join("taken");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("inner"), "keep").unwrap();

        let err = write_atomic(&path, b"data").unwrap_err();
        assert_eq!(err.code(), "IO_ERROR");
        assert_eq!(fs::read_to_string(path.join("inner")).unwrap(), "keep");
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }
}
