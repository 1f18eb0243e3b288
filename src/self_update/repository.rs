//! Backup Repository
//!
//! Enumerates the on-disk backup set for a base name and derives the next
//! version number from it. There is no persisted counter: the scan is the
//! source of truth, so numbering survives restarts and manual deletions.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use super::naming;
use super::ReplaceError;

/// A point-in-time copy of the tracked file, reconstructed from its name
/// and directory entry.
#[derive(Clone, Debug)]
pub struct BackupRecord {
    pub path: PathBuf,
    pub file_name: String,
    /// The `YYYYMMDD_HHMMSS` portion embedded in the name.
    pub stamp: String,
    pub version: u64,
    /// Filesystem modification time, used as the primary ordering key.
    pub modified: SystemTime,
}

/// List all backups for `base` in `dir`, ordered by modification time
/// ascending. Ties are broken by embedded version ascending so the order is
/// deterministic even on filesystems with coarse timestamps.
pub fn list_backups(dir: &Path, base: &str) -> Result<Vec<BackupRecord>, ReplaceError> {
    let entries = fs::read_dir(dir).map_err(|e| ReplaceError::io(dir, e))?;

    let mut records = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ReplaceError::io(dir, e))?;
        // Names that are not valid UTF-8 cannot match the ASCII grammar.
        let file_name = match entry.file_name().into_string() {
            Ok(n) => n,
            Err(_) => continue,
        };
        let parsed = match naming::parse(&file_name, base) {
            Some(p) => p,
            None => continue,
        };
        let path = entry.path();
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .map_err(|e| ReplaceError::io(&path, e))?;

        records.push(BackupRecord {
            path,
            file_name,
            stamp: parsed.stamp,
            version: parsed.version,
            modified,
        });
    }

    records.sort_by(|a, b| {
        a.modified
            .cmp(&b.modified)
            .then(a.version.cmp(&b.version))
    });

    debug!(base, count = records.len(), "listed backups");
    Ok(records)
}

/// The next version number for `base`: one past the highest existing
/// version, or 1 when no backups exist. Deleted numbers below the max are
/// never reused.
pub fn next_version(dir: &Path, base: &str) -> Result<u64, ReplaceError> {
    let max = list_backups(dir, base)?
        .iter()
        .map(|r| r.version)
        .max()
        .unwrap_or(0);
    Ok(max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn empty_directory_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let records = list_backups(dir.path(), "calc").unwrap();
        assert!(records.is_empty());
        assert_eq!(next_version(dir.path(), "calc").unwrap(), 1);
    }

    #[test]
    fn lists_in_order_and_computes_next_version() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("calc_20250101_100000_v1.bak"), "a").unwrap();
        fs::write(dir.path().join("calc_20250101_110000_v2.bak"), "b").unwrap();

        let records = list_backups(dir.path(), "calc").unwrap();
        assert_eq!(records.len(), 2);
        // Same-second mtimes are possible here; the version tiebreak keeps
        // the order deterministic either way.
        assert_eq!(records[0].version, 1);
        assert_eq!(records[1].version, 2);
        assert_eq!(records[0].stamp, "20250101_100000");

        assert_eq!(next_version(dir.path(), "calc").unwrap(), 3);
    }

    #[test]
    fn near_miss_names_are_excluded() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("calc_20250101_100000_v1.bak"), "a").unwrap();
        fs::write(dir.path().join("calc_2025010_100000_v9.bak"), "x").unwrap();
        fs::write(dir.path().join("calc_20250101_100000_v9.txt"), "x").unwrap();
        fs::write(dir.path().join("other_20250101_100000_v9.bak"), "x").unwrap();

        let records = list_backups(dir.path(), "calc").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].version, 1);
        assert_eq!(next_version(dir.path(), "calc").unwrap(), 2);
    }

    #[test]
    fn deleted_versions_below_max_are_not_reused() {
        let dir = tempfile::tempdir().unwrap();
        for v in [1u64, 2, 3, 4] {
            let name = format!("calc_20250101_10000{}_v{}.bak", v, v);
            fs::write(dir.path().join(name), "x").unwrap();
        }
        fs::remove_file(dir.path().join("calc_20250101_100002_v2.bak")).unwrap();
        fs::remove_file(dir.path().join("calc_20250101_100003_v3.bak")).unwrap();

        assert_eq!(next_version(dir.path(), "calc").unwrap(), 5);
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("nope");
        assert!(matches!(
            list_backups(&gone, "calc"),
            Err(ReplaceError::Io { .. })
        ));
    }
}
