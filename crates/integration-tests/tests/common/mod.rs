//! Shared helpers for queue integration tests

#![allow(dead_code)]

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use strand_core::port::error_handler::mocks::RecordingErrorHandler;
use strand_core::{
    create_queue, ExclusiveQueue, ExclusiveQueueExt, QueueSpec, QueueStats, Strategy,
};

pub const TIMEOUT: Duration = Duration::from_secs(10);

/// One queue per strategy, each reporting to its own recorder
pub fn queue_per_strategy(
    prefix: &str,
) -> Vec<(Arc<dyn ExclusiveQueue>, Arc<RecordingErrorHandler>)> {
    Strategy::ALL
        .into_iter()
        .map(|strategy| new_queue(&format!("{}-{}", prefix, strategy), strategy))
        .collect()
}

pub fn new_queue(
    name: &str,
    strategy: Strategy,
) -> (Arc<dyn ExclusiveQueue>, Arc<RecordingErrorHandler>) {
    let handler = Arc::new(RecordingErrorHandler::new());
    let spec = QueueSpec::new(name, strategy).unwrap();
    let queue = create_queue(spec, handler.clone()).unwrap();
    (queue, handler)
}

/// Block until everything submitted to `queue` so far has run
pub fn flush(queue: &dyn ExclusiveQueue) {
    let (tx, rx) = mpsc::channel();
    queue
        .post_fn(move || {
            let _ = tx.send(());
        })
        .unwrap();
    rx.recv_timeout(TIMEOUT)
        .unwrap_or_else(|_| panic!("queue '{}' did not drain", queue.name()));
}

/// Evaluate `probe` on `queue` and wait for the answer
pub fn ask<T, F>(queue: &dyn ExclusiveQueue, probe: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    queue
        .post_fn(move || {
            let _ = tx.send(probe());
        })
        .unwrap();
    rx.recv_timeout(TIMEOUT)
        .unwrap_or_else(|_| panic!("queue '{}' did not answer", queue.name()))
}

/// Flush, then wait for the counters to account for every submission
///
/// A barrier action signals from inside itself, before the queue records it
/// as completed, so its own count lands a moment after `flush` returns.
pub fn settled_stats(queue: &dyn ExclusiveQueue) -> QueueStats {
    flush(queue);
    let deadline = Instant::now() + TIMEOUT;
    loop {
        let stats = queue.stats();
        if stats.pending() == 0 {
            return stats;
        }
        assert!(
            Instant::now() < deadline,
            "queue '{}' never settled: {:?}",
            queue.name(),
            stats
        );
        thread::sleep(Duration::from_millis(1));
    }
}
