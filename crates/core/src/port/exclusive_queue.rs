// Exclusive Queue Port
// The contract every execution strategy implements

use crate::domain::{Action, ActionResult, QueueId, QueueSpec, QueueStats};
use crate::error::Result;
use std::fmt;

/// Ordered, non-overlapping execution of submitted actions on one logical thread
///
/// Implementations:
/// - AffinityQueue: a UI-affinity context's run loop
/// - DedicatedWorkerQueue: one persistent background thread
/// - SharedPoolQueue: a shared pool slot capped at one concurrent action
///
/// Guarantees, identical across strategies:
/// - actions run in submission order
/// - no two actions of the same queue overlap
/// - a failing action is reported to the queue's error handler and never
///   reaches the submitter or stops the queue
/// - once disposed, nothing submitted afterwards runs
pub trait ExclusiveQueue: Send + Sync {
    fn id(&self) -> QueueId;

    fn spec(&self) -> &QueueSpec;

    fn name(&self) -> &str {
        self.spec().name()
    }

    /// Hand an action to the queue (fire-and-forget)
    ///
    /// # Errors
    /// - QueueError::InvalidArgument if `action` is `None`
    ///
    /// Submitting to a disposed queue is not an error: the action is dropped.
    fn submit(&self, action: Option<Action>) -> Result<()>;

    /// True iff the caller is running on this queue's execution context
    ///
    /// Never blocks; callable from any thread.
    fn is_on_queue(&self) -> bool;

    fn is_disposed(&self) -> bool;

    /// Stop the queue. The first call tears down; later calls are no-ops.
    ///
    /// Dedicated worker and shared pool queues wait for the running action to
    /// finish. Called from inside the queue itself, they mark the queue
    /// disposed and return without waiting.
    fn dispose(&self);

    fn stats(&self) -> QueueStats;
}

impl fmt::Debug for dyn ExclusiveQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExclusiveQueue")
            .field("id", &self.id())
            .field("spec", self.spec())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Closure-friendly submission on any queue
pub trait ExclusiveQueueExt: ExclusiveQueue {
    /// Submit a fallible closure
    fn post<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce() -> ActionResult + Send + 'static,
    {
        self.submit(Some(Action::new(f)))
    }

    /// Submit a closure that cannot return an error
    fn post_fn<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(Some(Action::from_fn(f)))
    }
}

impl<Q: ExclusiveQueue + ?Sized> ExclusiveQueueExt for Q {}
