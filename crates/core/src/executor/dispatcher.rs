//! DispatcherThread - a UI-affinity execution context
//!
//! One named OS thread draining a FIFO of posted callbacks, the in-process
//! stand-in for a platform UI dispatcher loop. Affinity queues bind to it
//! through the [`AffinityContext`] port.

use crate::application::queue::constants::{PRIMARY_DISPATCHER_NAME, SECONDARY_DISPATCHER_NAME};
use crate::application::queue::panic_guard::{execute_guarded, PanicGuardResult};
use crate::error::Result;
use crate::port::{AffinityContext, Callback};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread::{self, JoinHandle, ThreadId};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

static PRIMARY: OnceLock<Arc<DispatcherThread>> = OnceLock::new();
static SECONDARY: OnceLock<Arc<DispatcherThread>> = OnceLock::new();

/// Single-threaded callback loop with thread affinity
pub struct DispatcherThread {
    name: String,
    thread_id: ThreadId,
    sender: Mutex<Option<mpsc::UnboundedSender<Callback>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl DispatcherThread {
    /// Start a new dispatcher on its own thread
    ///
    /// # Errors
    /// - QueueError::Io if the OS refuses to spawn the thread
    pub fn spawn(name: impl Into<String>) -> Result<Arc<Self>> {
        let name = name.into();
        let (tx, rx) = mpsc::unbounded_channel::<Callback>();

        let loop_name = name.clone();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || run_loop(&loop_name, rx))?;
        let thread_id = handle.thread().id();

        Ok(Arc::new(Self {
            name,
            thread_id,
            sender: Mutex::new(Some(tx)),
            handle: Mutex::new(Some(handle)),
        }))
    }

    /// The process's primary UI-affinity context, started on first use
    pub fn primary() -> Result<Arc<Self>> {
        shared(&PRIMARY, PRIMARY_DISPATCHER_NAME)
    }

    /// A secondary UI-affinity context, independent of the primary one
    pub fn secondary() -> Result<Arc<Self>> {
        shared(&SECONDARY, SECONDARY_DISPATCHER_NAME)
    }

    pub fn is_running(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some()
    }

    /// Close the loop: callbacks already posted still run, later posts are refused
    ///
    /// Waits for the loop thread to exit unless called from it. Shutting down
    /// `primary()` or `secondary()` is permanent for the process.
    pub fn shutdown(&self) {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if sender.is_none() {
            return;
        }
        drop(sender);

        if self.has_access() {
            warn!(dispatcher = %self.name, "Dispatcher shut down from its own thread, not joining");
            return;
        }

        let handle = self
            .handle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!(dispatcher = %self.name, "Dispatcher thread terminated abnormally");
            }
        }
    }
}

impl AffinityContext for DispatcherThread {
    fn name(&self) -> &str {
        &self.name
    }

    fn post(&self, callback: Callback) -> bool {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match sender.as_ref() {
            Some(tx) => tx.send(callback).is_ok(),
            None => false,
        }
    }

    fn has_access(&self) -> bool {
        thread::current().id() == self.thread_id
    }
}

fn shared(cell: &'static OnceLock<Arc<DispatcherThread>>, name: &str) -> Result<Arc<DispatcherThread>> {
    if let Some(dispatcher) = cell.get() {
        return Ok(Arc::clone(dispatcher));
    }
    let spawned = DispatcherThread::spawn(name)?;
    // Losing a first-use race drops `spawned`; its loop exits with the sender.
    Ok(Arc::clone(cell.get_or_init(|| spawned)))
}

fn run_loop(name: &str, mut rx: mpsc::UnboundedReceiver<Callback>) {
    info!(dispatcher = %name, "Dispatcher started");
    while let Some(callback) = rx.blocking_recv() {
        if let PanicGuardResult::Panicked(msg) = execute_guarded(callback) {
            error!(dispatcher = %name, panic_msg = %msg, "Dispatcher callback panicked");
        }
    }
    info!(dispatcher = %name, "Dispatcher stopped");
}
