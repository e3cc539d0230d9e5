//! DedicatedWorkerQueue - one background thread per queue
//!
//! The worker blocks on an unbounded FIFO until work arrives, runs it, and
//! loops. Disposal sets the disposed flag and pushes a sentinel so a blocked
//! worker wakes up, sees the flag and exits; whatever is still queued behind
//! it is discarded.

use super::constants::WORKER_THREAD_PREFIX;
use super::scope::{self, QueueScope};
use super::state::QueueCore;
use crate::domain::{Action, QueueId, QueueSpec, QueueStats};
use crate::error::Result;
use crate::port::{ErrorHandler, ExclusiveQueue};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

enum WorkItem {
    Run(Action),
    /// Reserved no-op that only wakes the worker
    Sentinel,
}

/// Queue owning one persistent worker thread
pub struct DedicatedWorkerQueue {
    core: Arc<QueueCore>,
    tx: mpsc::UnboundedSender<WorkItem>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl DedicatedWorkerQueue {
    /// Create the queue and start its worker thread
    ///
    /// # Errors
    /// - QueueError::Io if the worker thread cannot be spawned
    pub fn spawn(spec: QueueSpec, on_error: Arc<dyn ErrorHandler>) -> Result<Self> {
        let core = Arc::new(QueueCore::new(spec, on_error));
        let (tx, rx) = mpsc::unbounded_channel();

        let worker_core = Arc::clone(&core);
        let handle = thread::Builder::new()
            .name(format!("{}-{}", WORKER_THREAD_PREFIX, core.name()))
            .spawn(move || worker_loop(worker_core, rx))?;

        Ok(Self {
            core,
            tx,
            worker: Mutex::new(Some(handle)),
        })
    }
}

fn worker_loop(core: Arc<QueueCore>, mut rx: mpsc::UnboundedReceiver<WorkItem>) {
    let _scope = QueueScope::enter(core.id());
    info!(queue = %core.name(), "Worker started");

    let mut discarded = 0u64;
    while let Some(item) = rx.blocking_recv() {
        if core.is_disposed() {
            if let WorkItem::Run(_) = item {
                discarded += 1;
            }
            break;
        }
        match item {
            WorkItem::Run(action) => core.invoke(action),
            WorkItem::Sentinel => {}
        }
    }

    rx.close();
    while let Ok(item) = rx.try_recv() {
        if let WorkItem::Run(_) = item {
            discarded += 1;
        }
    }
    core.record_dropped(discarded);

    info!(queue = %core.name(), discarded, "Worker stopped");
}

impl ExclusiveQueue for DedicatedWorkerQueue {
    fn id(&self) -> QueueId {
        self.core.id()
    }

    fn spec(&self) -> &QueueSpec {
        self.core.spec()
    }

    fn submit(&self, action: Option<Action>) -> Result<()> {
        if let Some(action) = self.core.admit(action)? {
            // Worker already gone: disposal won the race
            if self.tx.send(WorkItem::Run(action)).is_err() {
                self.core.record_dropped(1);
            }
        }
        Ok(())
    }

    fn is_on_queue(&self) -> bool {
        scope::is_current(self.core.id())
    }

    fn is_disposed(&self) -> bool {
        self.core.is_disposed()
    }

    /// Stop the worker and wait for it to exit
    ///
    /// From the worker's own thread this cannot wait (it would join itself):
    /// the worker exits once the current action returns.
    fn dispose(&self) {
        if !self.core.mark_disposed() {
            return;
        }
        let _ = self.tx.send(WorkItem::Sentinel);

        if self.is_on_queue() {
            warn!(queue = %self.core.name(), "Queue disposed from its own worker, not waiting for exit");
            return;
        }

        let handle = self
            .worker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!(queue = %self.core.name(), "Worker thread terminated abnormally");
            }
        }
        info!(queue = %self.core.name(), "Dedicated worker queue disposed");
    }

    fn stats(&self) -> QueueStats {
        self.core.stats()
    }
}

impl Drop for DedicatedWorkerQueue {
    // Stops the worker of a queue that was never disposed
    fn drop(&mut self) {
        self.dispose();
    }
}
