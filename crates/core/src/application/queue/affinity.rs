//! AffinityQueue - actions delivered onto a UI-affinity context
//!
//! Submissions flow through a publish target into the queue's single
//! subscription, whose drains are posted onto the affinity context. The
//! context runs one callback at a time, so exclusivity comes for free;
//! ordering comes from the subscription's FIFO mailbox and its single drain
//! permit.
//!
//! Disposal swaps the publish target for a closed sink under the same lock
//! submitters publish through, so a racing `submit` either lands in the live
//! mailbox (and is discarded by the disposed check) or in the closed sink.

use super::constants::AFFINITY_DRAIN_BATCH;
use super::mailbox::Mailbox;
use super::state::QueueCore;
use crate::domain::{Action, QueueId, QueueSpec, QueueStats};
use crate::error::Result;
use crate::port::{AffinityContext, ErrorHandler, ExclusiveQueue};
use std::mem;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Queue bound to a UI-affinity context
pub struct AffinityQueue {
    core: Arc<QueueCore>,
    context: Arc<dyn AffinityContext>,
    sink: Mutex<Sink>,
}

enum Sink {
    Live(Arc<Subscription>),
    Closed,
}

/// The one consumer of the queue's actions, running on the affinity context
struct Subscription {
    core: Arc<QueueCore>,
    context: Arc<dyn AffinityContext>,
    mailbox: Mailbox,
}

impl AffinityQueue {
    pub fn new(
        spec: QueueSpec,
        context: Arc<dyn AffinityContext>,
        on_error: Arc<dyn ErrorHandler>,
    ) -> Self {
        let core = Arc::new(QueueCore::new(spec, on_error));
        let subscription = Arc::new(Subscription {
            core: Arc::clone(&core),
            context: Arc::clone(&context),
            mailbox: Mailbox::new(),
        });

        debug!(queue = %core.name(), context = %context.name(), "Affinity queue bound");
        Self {
            core,
            context,
            sink: Mutex::new(Sink::Live(subscription)),
        }
    }

    fn publish(&self, action: Action) {
        let sink = self
            .sink
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match &*sink {
            Sink::Live(subscription) => subscription.publish(action),
            Sink::Closed => self.core.record_dropped(1),
        }
    }
}

impl Subscription {
    fn publish(self: &Arc<Self>, action: Action) {
        if self.mailbox.push(action) {
            self.schedule();
        }
    }

    /// Post a drain; the caller holds the mailbox permit
    fn schedule(self: &Arc<Self>) {
        let subscription = Arc::clone(self);
        if !self.context.post(Box::new(move || subscription.drain())) {
            let dropped = self.mailbox.abandon();
            self.core.record_dropped(dropped);
            warn!(
                queue = %self.core.name(),
                context = %self.context.name(),
                dropped,
                "Affinity context has terminated, pending actions dropped"
            );
        }
    }

    fn drain(self: Arc<Self>) {
        for _ in 0..AFFINITY_DRAIN_BATCH {
            let Some(action) = self.mailbox.next() else {
                return;
            };
            if self.core.is_disposed() {
                self.core.record_dropped(1);
                continue;
            }
            self.core.invoke(action);
        }
        // Batch exhausted with the permit still held: let the UI loop breathe.
        self.schedule();
    }
}

impl ExclusiveQueue for AffinityQueue {
    fn id(&self) -> QueueId {
        self.core.id()
    }

    fn spec(&self) -> &QueueSpec {
        self.core.spec()
    }

    fn submit(&self, action: Option<Action>) -> Result<()> {
        if let Some(action) = self.core.admit(action)? {
            self.publish(action);
        }
        Ok(())
    }

    fn is_on_queue(&self) -> bool {
        self.context.has_access()
    }

    fn is_disposed(&self) -> bool {
        self.core.is_disposed()
    }

    fn dispose(&self) {
        if !self.core.mark_disposed() {
            return;
        }

        let previous = {
            let mut sink = self
                .sink
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            mem::replace(&mut *sink, Sink::Closed)
        };
        if let Sink::Live(subscription) = previous {
            let dropped = subscription.mailbox.clear();
            self.core.record_dropped(dropped);
        }

        info!(queue = %self.core.name(), context = %self.context.name(), "Affinity queue disposed");
    }

    fn stats(&self) -> QueueStats {
        self.core.stats()
    }
}
