//! Backup Writer
//!
//! Produces a byte-exact copy of the tracked file under a freshly numbered
//! backup identifier. A successful backup is the precondition for every
//! mutation of the tracked file; on any failure here the caller must leave
//! the tracked file alone.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use chrono::Local;
use tracing::info;

use super::{naming, repository, BackupRecord, ReplaceError};

/// Copy the current content of `tracked` into `dir` under the next backup
/// identifier for its base name. Creates exactly one new file and never
/// touches `tracked` itself.
pub fn create_backup(tracked: &Path, dir: &Path) -> Result<BackupRecord, ReplaceError> {
    let base = naming::base_name(tracked);

    let content = fs::read(tracked).map_err(|e| ReplaceError::io(tracked, e))?;

    let version = repository::next_version(dir, &base)?;
    let now = Local::now();
    let file_name = naming::backup_file_name(&base, now, version);
    let path = dir.join(&file_name);

    fs::write(&path, &content).map_err(|e| ReplaceError::io(&path, e))?;

    let modified = fs::metadata(&path)
        .and_then(|m| m.modified())
        .unwrap_or_else(|_| SystemTime::now());

    info!(backup = %file_name, version, bytes = content.len(), "created backup");

    Ok(BackupRecord {
        path,
        file_name,
        stamp: now.format(naming::STAMP_FORMAT).to_string(),
        version,
        modified,
    })
}
