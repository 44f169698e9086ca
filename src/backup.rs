//! Timestamped snapshots of the Claude settings file with retention pruning

use chrono::Local;
use std::cmp::Reverse;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{Error, Result};

/// Number of snapshots kept after each rotation
pub const DEFAULT_KEEP: usize = 5;

const PREFIX: &str = "settings-";
const EXTENSION: &str = "json";

/// A snapshot found in the backup directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    pub path: PathBuf,
    pub modified: SystemTime,
    pub size: u64,
}

impl BackupEntry {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Backup directory plus its retention policy
#[derive(Debug, Clone)]
pub struct Backups {
    dir: PathBuf,
    keep: usize,
}

impl Backups {
    pub fn new(dir: impl Into<PathBuf>, keep: usize) -> Self {
        Self {
            dir: dir.into(),
            keep,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn keep(&self) -> usize {
        self.keep
    }

    /// Copy `source` into the backup directory and prune old snapshots.
    ///
    /// Returns `None` when there is nothing to back up.
    pub fn snapshot(&self, source: &Path) -> Result<Option<PathBuf>> {
        let data = match fs::read(source) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::io(source, e)),
        };

        fs::create_dir_all(&self.dir).map_err(|e| Error::io(&self.dir, e))?;

        let stamp = Local::now().format("%Y%m%d-%H%M%S").to_string();
        let path = self.write_unique(&stamp, &data)?;
        tracing::debug!(
            source = %source.display(),
            backup = %path.display(),
            "created settings backup"
        );

        self.prune()?;
        Ok(Some(path))
    }

    /// Create the snapshot file without ever overwriting an older one taken
    /// within the same second.
    fn write_unique(&self, stamp: &str, data: &[u8]) -> Result<PathBuf> {
        let mut seq = 0u32;
        loop {
            let path = self.dir.join(backup_file_name(stamp, seq));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(data).map_err(|e| Error::io(&path, e))?;
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => seq += 1,
                Err(e) => return Err(Error::io(&path, e)),
            }
        }
    }

    /// Delete all but the newest `keep` snapshots, returning how many went
    pub fn prune(&self) -> Result<usize> {
        let entries = self.list()?;
        let mut removed = 0;
        for entry in entries.iter().skip(self.keep) {
            fs::remove_file(&entry.path).map_err(|e| Error::io(&entry.path, e))?;
            removed += 1;
        }
        if removed > 0 {
            tracing::debug!(dir = %self.dir.display(), removed, "pruned old backups");
        }
        Ok(removed)
    }

    /// Snapshots newest first: by modification time, then by file name
    pub fn list(&self) -> Result<Vec<BackupEntry>> {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io(&self.dir, e)),
        };

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| Error::io(&self.dir, e))?;
            let path = entry.path();
            let meta = entry.metadata().map_err(|e| Error::io(&path, e))?;
            if meta.is_dir() {
                continue;
            }
            entries.push(BackupEntry {
                modified: meta.modified().map_err(|e| Error::io(&path, e))?,
                size: meta.len(),
                path,
            });
        }

        entries.sort_by_key(|e| (Reverse(e.modified), Reverse(e.path.clone())));
        Ok(entries)
    }
}

/// `settings-YYYYMMDD-HHMMSS.json`, or `settings-YYYYMMDD-HHMMSS_NNN.json`
/// for the n-th extra snapshot in the same second. The suffix keeps names
/// unique and sorting in creation order.
fn backup_file_name(stamp: &str, seq: u32) -> String {
    if seq == 0 {
        format!("{PREFIX}{stamp}.{EXTENSION}")
    } else {
        format!("{PREFIX}{stamp}_{seq:03}.{EXTENSION}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;

    #[test]
    fn file_names_sort_in_creation_order() {
        let names = [
            backup_file_name("20250101-120000", 0),
            backup_file_name("20250101-120000", 1),
            backup_file_name("20250101-120000", 2),
            backup_file_name("20250101-120000", 10),
            backup_file_name("20250101-120001", 0),
        ];
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(sorted, names);
        assert_eq!(names[0], "settings-20250101-120000.json");
        assert_eq!(names[1], "settings-20250101-120000_001.json");
    }

    #[test]
    fn missing_source_is_a_noop() {
        let tmp = tempfile::tempdir().unwrap();
        let backups = Backups::new(tmp.path().join("backups"), DEFAULT_KEEP);

        let out = backups.snapshot(&tmp.path().join("nope.json")).unwrap();
        assert!(out.is_none());
        assert!(!backups.dir().exists());
    }

    #[test]
    fn snapshot_copies_raw_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("settings.json");
        fs::write(&source, b"{ not even json").unwrap();
        let backups = Backups::new(tmp.path().join("backups"), DEFAULT_KEEP);

        let path = backups.snapshot(&source).unwrap().unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"{ not even json");
        assert!(path.file_name().unwrap().to_string_lossy().starts_with(PREFIX));
    }

    #[test]
    fn prune_orders_by_mtime_before_name() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("backups");
        fs::create_dir_all(dir.join("nested")).unwrap();
        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);

        // Names deliberately disagree with modification times.
        for (name, offset) in [("a", 40), ("b", 30), ("c", 20), ("d", 10)] {
            let path = dir.join(name);
            let file = File::create(&path).unwrap();
            file.set_modified(base + Duration::from_secs(offset)).unwrap();
        }

        let backups = Backups::new(&dir, 2);
        assert_eq!(backups.prune().unwrap(), 2);

        let left: Vec<String> = backups.list().unwrap().iter().map(|e| e.file_name()).collect();
        assert_eq!(left, vec!["a", "b"]);
        assert!(dir.join("nested").is_dir(), "directories are never pruned");
    }

    #[test]
    fn ties_break_by_name() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().to_path_buf();
        let when = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        for name in ["x1", "x3", "x2"] {
            File::create(dir.join(name))
                .unwrap()
                .set_modified(when)
                .unwrap();
        }

        let names: Vec<String> = Backups::new(&dir, 5)
            .list()
            .unwrap()
            .iter()
            .map(|e| e.file_name())
            .collect();
        assert_eq!(names, vec!["x3", "x2", "x1"]);
    }

    #[test]
    fn prune_without_directory_removes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let backups = Backups::new(tmp.path().join("missing"), 1);
        assert_eq!(backups.prune().unwrap(), 0);
    }
}
