//! SharedPoolQueue - exclusive execution borrowed from a shared pool
//!
//! No thread is owned. A per-queue slot keeps pending actions in FIFO order
//! and admits at most one drain task onto the pool at a time (a scheduler
//! capped at one concurrent task). Each action additionally runs under the
//! slot's execution lock, the same lock `dispose` takes before flipping the
//! disposed flag, so once `dispose` returns nothing from this queue is
//! running or will run.

use super::constants::POOL_DRAIN_BATCH;
use super::mailbox::Mailbox;
use super::scope::{self, QueueScope};
use super::state::QueueCore;
use crate::domain::{Action, QueueId, QueueSpec, QueueStats};
use crate::error::Result;
use crate::executor::SharedPool;
use crate::port::{ErrorHandler, ExclusiveQueue};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Queue running on a shared pool, one action at a time
pub struct SharedPoolQueue {
    slot: Arc<Slot>,
}

struct Slot {
    core: Arc<QueueCore>,
    mailbox: Mailbox,
    exec: Mutex<()>,
    pool: SharedPool,
}

impl SharedPoolQueue {
    pub fn new(spec: QueueSpec, pool: SharedPool, on_error: Arc<dyn ErrorHandler>) -> Self {
        Self {
            slot: Arc::new(Slot {
                core: Arc::new(QueueCore::new(spec, on_error)),
                mailbox: Mailbox::new(),
                exec: Mutex::new(()),
                pool,
            }),
        }
    }
}

impl Slot {
    /// Put a drain on the pool; the caller holds the mailbox permit
    fn schedule(self: &Arc<Self>) {
        let slot = Arc::clone(self);
        let cancelled = Arc::clone(self);
        self.pool.spawn(move || slot.drain(), move || cancelled.abandon());
    }

    /// The pool's runtime shut down before the drain could start
    fn abandon(&self) {
        let dropped = self.mailbox.abandon();
        self.core.record_dropped(dropped);
        warn!(
            queue = %self.core.name(),
            dropped,
            "Shared pool has shut down, pending actions dropped"
        );
    }

    fn drain(self: Arc<Self>) {
        {
            let _scope = QueueScope::enter(self.core.id());
            for _ in 0..POOL_DRAIN_BATCH {
                let Some(action) = self.mailbox.next() else {
                    return;
                };
                let _running = self
                    .exec
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                if self.core.is_disposed() {
                    self.core.record_dropped(1);
                    continue;
                }
                self.core.invoke(action);
            }
        }
        // Batch exhausted with the permit still held: give the pool thread back.
        self.schedule();
    }
}

impl ExclusiveQueue for SharedPoolQueue {
    fn id(&self) -> QueueId {
        self.slot.core.id()
    }

    fn spec(&self) -> &QueueSpec {
        self.slot.core.spec()
    }

    fn submit(&self, action: Option<Action>) -> Result<()> {
        if let Some(action) = self.slot.core.admit(action)? {
            if self.slot.mailbox.push(action) {
                self.slot.schedule();
            }
        }
        Ok(())
    }

    fn is_on_queue(&self) -> bool {
        scope::is_current(self.slot.core.id())
    }

    fn is_disposed(&self) -> bool {
        self.slot.core.is_disposed()
    }

    /// Wait for the running action (if any), then mark the queue disposed
    ///
    /// From inside one of this queue's actions the execution lock is already
    /// held by the caller, so the queue is marked disposed without taking it.
    fn dispose(&self) {
        let core = &self.slot.core;
        if self.is_on_queue() {
            if core.mark_disposed() {
                core.record_dropped(self.slot.mailbox.clear());
                warn!(queue = %core.name(), "Queue disposed from its own action, not waiting");
            }
            return;
        }

        if core.is_disposed() {
            return;
        }
        // Empty the backlog first so the running drain finds nothing after its current action.
        let mut dropped = self.slot.mailbox.clear();

        let _running = self
            .slot
            .exec
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let first = core.mark_disposed();
        dropped += self.slot.mailbox.clear();
        core.record_dropped(dropped);
        if first {
            info!(queue = %core.name(), dropped, "Shared pool queue disposed");
        }
    }

    fn stats(&self) -> QueueStats {
        self.slot.core.stats()
    }
}
