//! Wait for a file to appear on disk.

use std::path::Path;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{SyncError, SyncResult};

/// Cadence at which [`wait_for_file`] re-checks the path.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// How a wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The file exists.
    Found,
    /// The caller cancelled before the file appeared.
    Cancelled,
}

/// Wait until `path` exists, checking every [`POLL_INTERVAL`].
pub async fn wait_for_file(path: &Path, cancel: &CancellationToken) -> SyncResult<WaitOutcome> {
    wait_for_file_with_interval(path, POLL_INTERVAL, cancel).await
}

/// Wait until `path` exists, checking immediately and then every `interval`.
pub async fn wait_for_file_with_interval(
    path: &Path,
    interval: Duration,
    cancel: &CancellationToken,
) -> SyncResult<WaitOutcome> {
    loop {
        if cancel.is_cancelled() {
            return Ok(WaitOutcome::Cancelled);
        }

        match tokio::fs::metadata(path).await {
            Ok(_) => {
                info!(path = %path.display(), "file found");
                return Ok(WaitOutcome::Found);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "file not yet present");
            }
            Err(source) => {
                return Err(SyncError::Stat {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }

        tokio::select! {
            () = cancel.cancelled() => return Ok(WaitOutcome::Cancelled),
            () = tokio::time::sleep(interval) => {}
        }
    }
}
