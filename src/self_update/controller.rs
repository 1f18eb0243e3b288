//! Replace / Revert Controller
//!
//! Orchestrates backup -> overwrite -> restart for both self-replacement
//! (externally supplied content) and revert (content from a chosen backup).
//! One operation may be in flight per process; the phase guard rejects a
//! second invocation of either kind with [`ReplaceError::Busy`]. Once an
//! operation starts, the backup/overwrite/restart sequence is never
//! interrupted from inside this module.

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use tracing::{debug, info};

use crate::restart::RestartRequest;

use super::{repository, writer, ReplaceError, TrackedFile};

/// Controller state. `Restarting` is terminal on success: the driver is
/// expected to re-exec the process. `Failed` (like `Idle`) permits a new
/// attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    BackingUp,
    Overwriting,
    Restarting,
    Failed,
}

/// Drives self-replacement and revert against one tracked file.
pub struct Controller {
    phase: Mutex<Phase>,
}

impl Controller {
    pub fn new() -> Self {
        Controller {
            phase: Mutex::new(Phase::Idle),
        }
    }

    pub fn phase(&self) -> Phase {
        *self.phase.lock().unwrap()
    }

    /// Claim the controller for a new operation. Only `Idle` and `Failed`
    /// are startable.
    fn start(&self) -> Result<(), ReplaceError> {
        let mut phase = self.phase.lock().unwrap();
        match *phase {
            Phase::Idle | Phase::Failed => {
                *phase = Phase::BackingUp;
                debug!(phase = ?*phase, "operation started");
                Ok(())
            }
            _ => Err(ReplaceError::Busy),
        }
    }

    fn enter(&self, next: Phase) {
        let mut phase = self.phase.lock().unwrap();
        debug!(from = ?*phase, to = ?next, "phase transition");
        *phase = next;
    }

    /// Overwrite the tracked file with `new_content`, after backing up its
    /// current content. Returns the restart request for the driver to exec;
    /// the overwrite is not rolled back if that exec later fails.
    pub fn replace(
        &self,
        tracked: &TrackedFile,
        backup_dir: &Path,
        new_content: &str,
    ) -> Result<RestartRequest, ReplaceError> {
        if new_content.trim().is_empty() {
            return Err(ReplaceError::EmptyContent);
        }
        self.start()?;
        info!(path = %tracked.path().display(), "self-replace requested");

        let backup = match writer::create_backup(tracked.path(), backup_dir) {
            Ok(b) => b,
            Err(e) => {
                self.enter(Phase::Failed);
                return Err(e);
            }
        };

        self.enter(Phase::Overwriting);
        // Truncate-and-write. A torn write leaves the tracked file partial;
        // the backup just created is the recovery path.
        if let Err(e) = fs::write(tracked.path(), new_content.as_bytes()) {
            self.enter(Phase::Failed);
            return Err(ReplaceError::io(tracked.path(), e));
        }

        self.enter(Phase::Restarting);
        info!(backup = %backup.file_name, "tracked file replaced, restart pending");
        Ok(RestartRequest::from_current_process())
    }

    /// Restore the tracked file from `chosen_name`, after backing up the
    /// version being abandoned. `chosen_name` must appear in the live
    /// backup listing; otherwise nothing is written and no backup is made.
    pub fn revert(
        &self,
        tracked: &TrackedFile,
        backup_dir: &Path,
        chosen_name: &str,
    ) -> Result<RestartRequest, ReplaceError> {
        self.start()?;
        info!(path = %tracked.path().display(), chosen = chosen_name, "revert requested");

        let listed = match repository::list_backups(backup_dir, tracked.base()) {
            Ok(l) => l,
            Err(e) => {
                self.enter(Phase::Failed);
                return Err(e);
            }
        };
        let chosen = match listed.into_iter().find(|r| r.file_name == chosen_name) {
            Some(r) => r,
            None => {
                self.enter(Phase::Failed);
                return Err(ReplaceError::NotFound {
                    name: chosen_name.to_string(),
                    base: tracked.base().to_string(),
                });
            }
        };

        if let Err(e) = writer::create_backup(tracked.path(), backup_dir) {
            self.enter(Phase::Failed);
            return Err(e);
        }

        self.enter(Phase::Overwriting);
        let content = match fs::read(&chosen.path) {
            Ok(c) => c,
            Err(e) => {
                self.enter(Phase::Failed);
                return Err(ReplaceError::io(&chosen.path, e));
            }
        };
        if let Err(e) = fs::write(tracked.path(), &content) {
            self.enter(Phase::Failed);
            return Err(ReplaceError::io(tracked.path(), e));
        }

        self.enter(Phase::Restarting);
        info!(backup = %chosen.file_name, "tracked file restored, restart pending");
        Ok(RestartRequest::from_current_process())
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}
