//! Reference-counted ipset membership.
//!
//! Several owners may want the same entry present in a kernel ipset. The
//! kernel only tracks presence, so [`RefCountedIpset`] keeps a counter per
//! `(set, entry)` pair and only issues the kernel call on the transitions
//! that change presence: `add` on 0 -> 1 and `del` on 1 -> 0.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{SyncError, SyncResult};

/// The calls that actually change kernel ipset state.
#[async_trait]
pub trait IpsetBackend: Send + Sync {
    /// Add `entry` to `set`.
    async fn add(&self, set: &str, entry: &str) -> SyncResult<()>;

    /// Remove `entry` from `set`.
    async fn del(&self, set: &str, entry: &str) -> SyncResult<()>;

    /// Destroy `set` entirely.
    async fn destroy(&self, set: &str) -> SyncResult<()>;
}

/// [`IpsetBackend`] that shells out to the `ipset` binary.
#[derive(Debug, Clone)]
pub struct CommandIpset {
    program: String,
}

impl Default for CommandIpset {
    fn default() -> Self {
        Self::new("ipset")
    }
}

impl CommandIpset {
    /// Use the given `ipset` executable.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(&self, action: &'static str, set: &str, entry: Option<&str>) -> SyncResult<()> {
        let mut cmd = Command::new(&self.program);
        cmd.arg(action).arg(set);
        if let Some(entry) = entry {
            cmd.arg(entry).arg("-exist");
        }

        debug!(program = %self.program, action, set, entry, "running ipset");
        let output = cmd.output().await.map_err(SyncError::IpsetSpawn)?;
        if output.status.success() {
            return Ok(());
        }

        Err(SyncError::IpsetCommand {
            action,
            set: set.to_owned(),
            entry: entry.unwrap_or_default().to_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        })
    }
}

#[async_trait]
impl IpsetBackend for CommandIpset {
    async fn add(&self, set: &str, entry: &str) -> SyncResult<()> {
        self.run("add", set, Some(entry)).await
    }

    async fn del(&self, set: &str, entry: &str) -> SyncResult<()> {
        self.run("del", set, Some(entry)).await
    }

    async fn destroy(&self, set: &str) -> SyncResult<()> {
        self.run("destroy", set, None).await
    }
}

type EntryKey = (String, String);

/// Reference-counted membership on top of an [`IpsetBackend`].
///
/// One lock covers the counter table and is held across the backend call,
/// so a failed kernel call never leaves the counter out of step.
#[derive(Debug)]
pub struct RefCountedIpset<B> {
    backend: B,
    counts: Mutex<HashMap<EntryKey, u32>>,
}

impl<B: IpsetBackend> RefCountedIpset<B> {
    /// Wrap `backend` with an empty counter table.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            counts: Mutex::new(HashMap::new()),
        }
    }

    /// The wrapped backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Take a reference on `entry` in `set`.
    ///
    /// Returns `true` if this call added the entry to the kernel set.
    pub async fn add_entry(&self, set: &str, entry: &str) -> SyncResult<bool> {
        let mut counts = self.counts.lock().await;
        let key = (set.to_owned(), entry.to_owned());
        let current = counts.get(&key).copied().unwrap_or(0);

        if current == 0 {
            self.backend.add(set, entry).await?;
        }
        counts.insert(key, current + 1);
        Ok(current == 0)
    }

    /// Drop a reference on `entry` in `set`.
    ///
    /// Returns `true` if this call removed the entry from the kernel set.
    /// Dropping an entry that holds no references does nothing.
    pub async fn del_entry(&self, set: &str, entry: &str) -> SyncResult<bool> {
        let mut counts = self.counts.lock().await;
        let key = (set.to_owned(), entry.to_owned());
        let Some(current) = counts.get(&key).copied() else {
            debug!(set, entry, "ignoring delete of unreferenced ipset entry");
            return Ok(false);
        };

        if current == 1 {
            self.backend.del(set, entry).await?;
            counts.remove(&key);
            return Ok(true);
        }
        counts.insert(key, current - 1);
        Ok(false)
    }

    /// Current reference count for `entry` in `set`.
    pub async fn ref_count(&self, set: &str, entry: &str) -> u32 {
        self.counts
            .lock()
            .await
            .get(&(set.to_owned(), entry.to_owned()))
            .copied()
            .unwrap_or(0)
    }

    /// Destroy `set` and forget every reference held on its entries.
    pub async fn destroy_set(&self, set: &str) -> SyncResult<()> {
        let mut counts = self.counts.lock().await;
        self.backend.destroy(set).await?;
        counts.retain(|(s, _), _| s != set);
        Ok(())
    }
}
