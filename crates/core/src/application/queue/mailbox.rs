// Mailbox - ordered pending actions plus a single drain permit
//
// At most one drain is scheduled at any time: `push` hands out the permit
// when nobody holds it, and only `next` returning `None` gives it back.

use crate::domain::Action;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

struct MailboxState {
    pending: VecDeque<Action>,
    scheduled: bool,
}

pub(crate) struct Mailbox {
    state: Mutex<MailboxState>,
}

impl Mailbox {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(MailboxState {
                pending: VecDeque::new(),
                scheduled: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MailboxState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append an action; true if the caller now holds the permit and must schedule a drain
    pub(crate) fn push(&self, action: Action) -> bool {
        let mut state = self.lock();
        state.pending.push_back(action);
        if state.scheduled {
            false
        } else {
            state.scheduled = true;
            true
        }
    }

    /// Oldest pending action; `None` releases the permit
    pub(crate) fn next(&self) -> Option<Action> {
        let mut state = self.lock();
        let action = state.pending.pop_front();
        if action.is_none() {
            state.scheduled = false;
        }
        action
    }

    /// Discard the backlog, returning how many actions were dropped
    ///
    /// The permit is left alone: a drain in flight releases it itself.
    pub(crate) fn clear(&self) -> u64 {
        let mut state = self.lock();
        let dropped = state.pending.len() as u64;
        state.pending.clear();
        dropped
    }

    /// Discard the backlog and release the permit (the drain could not be scheduled)
    pub(crate) fn abandon(&self) -> u64 {
        let mut state = self.lock();
        let dropped = state.pending.len() as u64;
        state.pending.clear();
        state.scheduled = false;
        dropped
    }
}
