//! Error types for the coordination helpers.

use std::path::PathBuf;

/// Errors produced by the coordination helpers.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// An `ipset` invocation exited unsuccessfully.
    #[error("ipset {action} {set} {entry} failed: {stderr}")]
    IpsetCommand {
        /// The ipset sub-command (`add`, `del`, `destroy`).
        action: &'static str,
        /// The set name.
        set: String,
        /// The entry, empty for set-level commands.
        entry: String,
        /// Captured standard error of the command.
        stderr: String,
    },

    /// The `ipset` binary could not be spawned.
    #[error("failed to run ipset: {0}")]
    IpsetSpawn(#[source] std::io::Error),

    /// Checking for a file failed for a reason other than absence.
    #[error("failed to stat {}: {source}", path.display())]
    Stat {
        /// The path being checked.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Opening a watch stream failed.
    #[error("failed to open watch: {0}")]
    WatchOpen(String),
}

/// Convenience result type for the coordination helpers.
pub type SyncResult<T> = Result<T, SyncError>;
