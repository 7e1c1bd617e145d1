//! Long-lived watch subscriptions.
//!
//! Server-side watch streams end for ordinary reasons (timeouts, restarts,
//! connection resets). [`DynamicWatch`] hides that from consumers: it
//! reopens the stream after a fixed delay each time it closes and forwards
//! every event onto one unbounded channel.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::SyncResult;

/// Delay before a closed watch is reopened.
pub const DEFAULT_REOPEN_DELAY: Duration = Duration::from_secs(1);

/// Something that can open a stream of change events.
#[async_trait]
pub trait WatchSource: Send + Sync + 'static {
    /// The event type delivered by the stream.
    type Event: Send + 'static;

    /// Open a new watch stream.
    async fn open(&self) -> SyncResult<BoxStream<'static, Self::Event>>;
}

/// A watch that is re-established whenever it terminates.
#[derive(Debug)]
pub struct DynamicWatch;

impl DynamicWatch {
    /// Start watching `source` on a background task.
    ///
    /// The task runs until `cancel` fires or the returned receiver is
    /// dropped.
    pub fn spawn<S: WatchSource>(
        source: S,
        reopen_delay: Duration,
        cancel: CancellationToken,
    ) -> (mpsc::UnboundedReceiver<S::Event>, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(source, reopen_delay, cancel, tx));
        (rx, handle)
    }
}

async fn run<S: WatchSource>(
    source: S,
    reopen_delay: Duration,
    cancel: CancellationToken,
    tx: mpsc::UnboundedSender<S::Event>,
) {
    loop {
        let opened = tokio::select! {
            () = cancel.cancelled() => return,
            opened = source.open() => opened,
        };

        match opened {
            Ok(mut stream) => {
                debug!("watch opened");
                loop {
                    tokio::select! {
                        () = cancel.cancelled() => return,
                        item = stream.next() => match item {
                            Some(event) => {
                                if tx.send(event).is_err() {
                                    debug!("watch receiver dropped, stopping");
                                    return;
                                }
                            }
                            None => {
                                info!(delay_ms = reopen_delay.as_millis(), "watch closed, reopening");
                                break;
                            }
                        },
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, delay_ms = reopen_delay.as_millis(), "failed to open watch, retrying");
            }
        }

        if tx.is_closed() {
            return;
        }

        tokio::select! {
            () = cancel.cancelled() => return,
            () = tokio::time::sleep(reopen_delay) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::SyncError;

    const DELAY: Duration = Duration::from_millis(10);

    /// Emits `per_open` numbered events and closes; the first `failures`
    /// opens fail.
    struct CountingSource {
        opens: Arc<AtomicUsize>,
        per_open: usize,
        failures: usize,
    }

    #[async_trait]
    impl WatchSource for CountingSource {
        type Event = (usize, usize);

        async fn open(&self) -> SyncResult<BoxStream<'static, Self::Event>> {
            let attempt = self.opens.fetch_add(1, Ordering::SeqCst);
            if attempt < self.failures {
                return Err(SyncError::WatchOpen("server unavailable".to_owned()));
            }
            let events: Vec<_> = (0..self.per_open).map(|i| (attempt, i)).collect();
            Ok(futures::stream::iter(events).boxed())
        }
    }

    async fn recv(rx: &mut mpsc::UnboundedReceiver<(usize, usize)>) -> (usize, usize) {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_should_reopen_closed_watch_and_forward_events() {
        let opens = Arc::new(AtomicUsize::new(0));
        let source = CountingSource {
            opens: Arc::clone(&opens),
            per_open: 2,
            failures: 0,
        };
        let cancel = CancellationToken::new();
        let (mut rx, handle) = DynamicWatch::spawn(source, DELAY, cancel.clone());

        assert_eq!(recv(&mut rx).await, (0, 0));
        assert_eq!(recv(&mut rx).await, (0, 1));
        assert_eq!(recv(&mut rx).await, (1, 0));
        assert_eq!(recv(&mut rx).await, (1, 1));
        assert!(opens.load(Ordering::SeqCst) >= 2);

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_should_retry_failed_opens() {
        let opens = Arc::new(AtomicUsize::new(0));
        let source = CountingSource {
            opens: Arc::clone(&opens),
            per_open: 1,
            failures: 2,
        };
        let cancel = CancellationToken::new();
        let (mut rx, handle) = DynamicWatch::spawn(source, DELAY, cancel.clone());

        assert_eq!(recv(&mut rx).await, (2, 0));

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_should_wait_reopen_delay_between_streams() {
        let source = CountingSource {
            opens: Arc::new(AtomicUsize::new(0)),
            per_open: 1,
            failures: 0,
        };
        let cancel = CancellationToken::new();
        let start = tokio::time::Instant::now();
        let (mut rx, handle) = DynamicWatch::spawn(source, DEFAULT_REOPEN_DELAY, cancel.clone());

        assert_eq!(recv(&mut rx).await, (0, 0));
        assert!(start.elapsed() < DEFAULT_REOPEN_DELAY);

        assert_eq!(recv(&mut rx).await, (1, 0));
        let elapsed = start.elapsed();
        assert!(elapsed >= DEFAULT_REOPEN_DELAY, "{elapsed:?}");
        assert!(elapsed < DEFAULT_REOPEN_DELAY * 2, "{elapsed:?}");

        assert_eq!(recv(&mut rx).await, (2, 0));
        assert!(start.elapsed() >= DEFAULT_REOPEN_DELAY * 2);

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_should_wait_reopen_delay_after_failed_open() {
        let source = CountingSource {
            opens: Arc::new(AtomicUsize::new(0)),
            per_open: 1,
            failures: 1,
        };
        let cancel = CancellationToken::new();
        let start = tokio::time::Instant::now();
        let (mut rx, handle) = DynamicWatch::spawn(source, DEFAULT_REOPEN_DELAY, cancel.clone());

        assert_eq!(recv(&mut rx).await, (1, 0));
        let elapsed = start.elapsed();
        assert!(elapsed >= DEFAULT_REOPEN_DELAY, "{elapsed:?}");
        assert!(elapsed < DEFAULT_REOPEN_DELAY * 2, "{elapsed:?}");

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_should_stop_when_receiver_dropped() {
        let source = CountingSource {
            opens: Arc::new(AtomicUsize::new(0)),
            per_open: 1,
            failures: 0,
        };
        let (rx, handle) = DynamicWatch::spawn(source, DELAY, CancellationToken::new());
        drop(rx);

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
