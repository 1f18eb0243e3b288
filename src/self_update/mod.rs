//! Self-Update Subsystem
//!
//! Versioned self-replacement for the tracked source file: backup naming,
//! backup enumeration and version numbering, byte-exact backup writing, and
//! the replace/revert controller. Every mutation of the tracked file is
//! gated on a successful backup of its current content.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod naming;
pub mod repository;
pub mod writer;
pub mod controller;

pub use controller::{Controller, Phase};
pub use repository::BackupRecord;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure taxonomy for replace and revert operations.
///
/// No variant is retried automatically; each failure ends the current
/// operation and is reported to the caller with its underlying cause.
#[derive(Debug, Error)]
pub enum ReplaceError {
    /// Read/write/create failure on the tracked file or a backup.
    #[error("i/o failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The chosen backup is absent from the live backup listing.
    #[error("backup {name} not found for {base}")]
    NotFound { name: String, base: String },

    /// The replacement content was empty after sanitization.
    #[error("replacement content is empty")]
    EmptyContent,

    /// Re-executing the current binary failed. The overwrite has already
    /// happened and is not rolled back.
    #[error("failed to re-exec {}: {source}", program.display())]
    Restart {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Another replace or revert is already in flight in this process.
    #[error("a replace or revert operation is already in progress")]
    Busy,
}

impl ReplaceError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        ReplaceError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

// ---------------------------------------------------------------------------
// Tracked file
// ---------------------------------------------------------------------------

/// The single file this subsystem mutates. The path is fixed at process
/// start; content changes only through [`Controller`].
#[derive(Clone, Debug)]
pub struct TrackedFile {
    path: PathBuf,
    base: String,
}

impl TrackedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let base = naming::base_name(&path);
        TrackedFile { path, base }
    }

    /// Derive the tracked file from the running program's invocation path,
    /// resolved to an absolute path when possible.
    pub fn from_invocation() -> Self {
        let raw = std::env::args_os()
            .next()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("morphcalc"));
        let path = std::fs::canonicalize(&raw).unwrap_or(raw);
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the tracked file's current content as text.
    pub fn source(&self) -> Result<String, ReplaceError> {
        std::fs::read_to_string(&self.path).map_err(|e| ReplaceError::io(&self.path, e))
    }

    /// Logical name: the file name without its extension.
    pub fn base(&self) -> &str {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracked_file_base_strips_extension() {
        let t = TrackedFile::new("/opt/tools/calc.rs");
        assert_eq!(t.base(), "calc");
        assert_eq!(t.path(), Path::new("/opt/tools/calc.rs"));
    }

    #[test]
    fn tracked_file_base_without_extension() {
        let t = TrackedFile::new("/usr/local/bin/morphcalc");
        assert_eq!(t.base(), "morphcalc");
    }

    #[test]
    fn source_reads_current_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calc.rs");
        std::fs::write(&path, "fn main() {}\n").unwrap();

        let t = TrackedFile::new(&path);
        assert_eq!(t.source().unwrap(), "fn main() {}\n");

        let gone = TrackedFile::new(dir.path().join("gone.rs"));
        assert!(matches!(gone.source(), Err(ReplaceError::Io { .. })));
    }
}
