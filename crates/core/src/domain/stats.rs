// Queue statistics snapshot

use super::queue::Strategy;
use serde::{Deserialize, Serialize};

/// Point-in-time counters for one queue
///
/// Counters are read independently, so a snapshot taken while actions are
/// running may be off by the in-flight ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    pub name: String,
    pub strategy: Strategy,
    pub submitted: u64,
    pub completed: u64,
    pub failed: u64,
    /// Submitted after disposal, or discarded from the backlog by disposal
    pub dropped: u64,
    pub disposed: bool,
}

impl QueueStats {
    /// Actions accepted but not yet completed, failed or dropped
    pub fn pending(&self) -> u64 {
        self.submitted
            .saturating_sub(self.completed + self.failed + self.dropped)
    }
}
