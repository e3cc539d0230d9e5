// Context-local queue identity
//
// Each thread records which queue (if any) it is currently executing for.
// Dedicated workers enter their scope once at thread start; shared pool
// drains enter it for the duration of one drain.

use crate::domain::QueueId;
use std::cell::Cell;

thread_local! {
    static CURRENT: Cell<Option<QueueId>> = const { Cell::new(None) };
}

/// Marks the current thread as executing for a queue until dropped
pub(crate) struct QueueScope {
    previous: Option<QueueId>,
}

impl QueueScope {
    pub(crate) fn enter(id: QueueId) -> Self {
        let previous = CURRENT.with(|current| current.replace(Some(id)));
        Self { previous }
    }
}

impl Drop for QueueScope {
    fn drop(&mut self) {
        CURRENT.with(|current| current.set(self.previous));
    }
}

/// True if the calling thread is inside `id`'s scope
pub(crate) fn is_current(id: QueueId) -> bool {
    CURRENT.with(|current| current.get() == Some(id))
}
