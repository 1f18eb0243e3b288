//! Process Restart
//!
//! Re-executes the current binary with its original argument vector so a
//! freshly written tracked file takes effect as running code. Controllers
//! return a [`RestartRequest`] instead of exec'ing themselves; only the
//! outermost driver calls [`reexec`], which keeps the controllers testable.

use std::ffi::OsString;
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::Command;

use tracing::info;

use crate::self_update::ReplaceError;

/// The terminal outcome of a successful replace or revert: which program to
/// exec and with which arguments.
#[derive(Clone, Debug)]
pub struct RestartRequest {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl RestartRequest {
    /// Capture the running program's own invocation: argv[0] as the program,
    /// the remaining argv entries as its arguments.
    pub fn from_current_process() -> Self {
        let mut argv = std::env::args_os();
        let program = argv
            .next()
            .map(PathBuf::from)
            .or_else(|| std::env::current_exe().ok())
            .unwrap_or_else(|| PathBuf::from("morphcalc"));
        RestartRequest {
            program,
            args: argv.collect(),
        }
    }
}

/// Replace the current process image. Does not return on success; on
/// failure the exec error comes back as [`ReplaceError::Restart`] and the
/// already-overwritten tracked file is left as is.
pub fn reexec(request: RestartRequest) -> ReplaceError {
    info!(program = %request.program.display(), "re-executing process");
    let source = Command::new(&request.program).args(&request.args).exec();
    ReplaceError::Restart {
        program: request.program,
        source,
    }
}
