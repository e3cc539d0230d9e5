// Shared queue state - the part of the contract every strategy delegates to

use super::panic_guard::{execute_guarded, run_contained, PanicGuardResult};
use crate::domain::{Action, ActionError, QueueId, QueueSpec, QueueStats};
use crate::error::{QueueError, Result};
use crate::port::ErrorHandler;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Identity, disposed flag, error routing and counters of one queue
///
/// `disposed` is monotonic: it flips to true once and never back.
pub(crate) struct QueueCore {
    id: QueueId,
    spec: QueueSpec,
    disposed: AtomicBool,
    on_error: Arc<dyn ErrorHandler>,
    submitted: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

impl QueueCore {
    pub(crate) fn new(spec: QueueSpec, on_error: Arc<dyn ErrorHandler>) -> Self {
        Self {
            id: QueueId::new(),
            spec,
            disposed: AtomicBool::new(false),
            on_error,
            submitted: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    pub(crate) fn id(&self) -> QueueId {
        self.id
    }

    pub(crate) fn spec(&self) -> &QueueSpec {
        &self.spec
    }

    pub(crate) fn name(&self) -> &str {
        self.spec.name()
    }

    /// Submission gate shared by all strategies
    ///
    /// Returns the action if it should be enqueued, `None` if the queue is
    /// disposed and the action was dropped.
    pub(crate) fn admit(&self, action: Option<Action>) -> Result<Option<Action>> {
        let action = action.ok_or_else(|| {
            QueueError::InvalidArgument(format!(
                "no action submitted to queue '{}'",
                self.name()
            ))
        })?;

        self.submitted.fetch_add(1, Ordering::Relaxed);
        if self.is_disposed() {
            self.record_dropped(1);
            debug!(queue = %self.name(), "Queue disposed, dropping submitted action");
            return Ok(None);
        }
        Ok(Some(action))
    }

    /// Run an action with exception containment
    ///
    /// Failures go to the error handler on the calling thread; nothing
    /// propagates out of this call.
    pub(crate) fn invoke(&self, action: Action) {
        match run_contained(action) {
            Ok(()) => {
                self.completed.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                warn!(queue = %self.name(), error = %err, "Action failed, reporting to error handler");
                self.report(err);
            }
        }
    }

    fn report(&self, err: ActionError) {
        let handler = Arc::clone(&self.on_error);
        if let PanicGuardResult::Panicked(msg) = execute_guarded(move || handler.on_error(err)) {
            error!(
                queue = %self.name(),
                panic_msg = %msg,
                "Error handler panicked while reporting an action failure"
            );
        }
    }

    /// Flip the disposed flag; true only for the caller that flipped it
    pub(crate) fn mark_disposed(&self) -> bool {
        !self.disposed.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    pub(crate) fn record_dropped(&self, count: u64) {
        if count > 0 {
            self.dropped.fetch_add(count, Ordering::Relaxed);
        }
    }

    pub(crate) fn stats(&self) -> QueueStats {
        QueueStats {
            name: self.name().to_string(),
            strategy: self.spec.strategy(),
            submitted: self.submitted.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            disposed: self.is_disposed(),
        }
    }
}
