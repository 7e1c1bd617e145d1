//! Process-local coordination helpers for MetalStack.
//!
//! - [`NamedMutexRegistry`]: one lock per string key, created on first use
//! - [`RefCountedIpset`]: reference-counted ipset membership that only
//!   touches the kernel on the first add and the last delete
//! - [`wait_for_file`]: poll until a path appears or the caller cancels
//! - [`DynamicWatch`]: keep a server-side watch open, reopening it after a
//!   fixed delay whenever it closes

pub mod error;
pub mod ipset;
pub mod mutex;
pub mod wait;
pub mod watch;

pub use error::{SyncError, SyncResult};
pub use ipset::{CommandIpset, IpsetBackend, RefCountedIpset};
pub use mutex::NamedMutexRegistry;
pub use wait::{POLL_INTERVAL, WaitOutcome, wait_for_file, wait_for_file_with_interval};
pub use watch::{DEFAULT_REOPEN_DELAY, DynamicWatch, WatchSource};
