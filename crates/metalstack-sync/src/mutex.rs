//! Named mutex registry.
//!
//! Provides [`NamedMutexRegistry`], a map from string key to an async mutex.
//! Locks are created on first request and never removed, so two callers
//! asking for the same key always contend on the same lock.

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;

/// Thread-safe registry of named locks.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use metalstack_sync::NamedMutexRegistry;
///
/// let registry = NamedMutexRegistry::new();
/// let a = registry.get("bucket/key");
/// let b = registry.get("bucket/key");
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
#[derive(Debug, Default)]
pub struct NamedMutexRegistry {
    inner: DashMap<String, Arc<Mutex<()>>>,
}

impl NamedMutexRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    /// The process-wide registry.
    #[must_use]
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<NamedMutexRegistry> = OnceLock::new();
        GLOBAL.get_or_init(Self::new)
    }

    /// Get the lock for `key`, creating it atomically if it does not exist.
    #[must_use]
    pub fn get(&self, key: &str) -> Arc<Mutex<()>> {
        if let Some(existing) = self.inner.get(key) {
            return Arc::clone(existing.value());
        }
        self.inner
            .entry(key.to_owned())
            .or_insert_with(|| {
                trace!(key, "created named mutex");
                Arc::new(Mutex::new(()))
            })
            .clone()
    }

    /// Acquire the lock for `key`, waiting for any current holder.
    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        self.get(key).lock_owned().await
    }

    /// Number of keys that have ever been locked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether no key has been requested yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
