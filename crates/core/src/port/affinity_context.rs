// Affinity Context Port
// A pre-existing single-threaded run loop (UI dispatcher) that work can be posted to

/// Callback posted onto an affinity context's run loop
pub type Callback = Box<dyn FnOnce() + Send + 'static>;

/// UI-affinity execution context
///
/// Implementations:
/// - DispatcherThread: dedicated OS thread running a FIFO callback loop
/// - ManualContext (mocks): callbacks run explicitly by a test thread
///
/// The context runs posted callbacks one at a time, in posting order, on a
/// single thread. Affinity queues rely on that for their exclusivity.
pub trait AffinityContext: Send + Sync {
    /// Human-readable context name (for logs)
    fn name(&self) -> &str;

    /// Schedule `callback` on the run loop
    ///
    /// Returns false if the loop has terminated; the callback is dropped.
    fn post(&self, callback: Callback) -> bool;

    /// True if the calling thread is the context's own thread
    fn has_access(&self) -> bool;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use std::thread::{self, ThreadId};

    /// Context owned by the thread that created it; nothing runs until that
    /// thread calls `run_pending`
    pub struct ManualContext {
        name: String,
        owner: ThreadId,
        pending: Mutex<VecDeque<Callback>>,
        closed: AtomicBool,
    }

    impl ManualContext {
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                owner: thread::current().id(),
                pending: Mutex::new(VecDeque::new()),
                closed: AtomicBool::new(false),
            }
        }

        /// Number of callbacks waiting to run
        pub fn backlog(&self) -> usize {
            self.pending.lock().unwrap().len()
        }

        /// Run callbacks until the backlog is empty, including ones posted meanwhile
        pub fn run_pending(&self) -> usize {
            let mut ran = 0;
            while self.run_one() {
                ran += 1;
            }
            ran
        }

        /// Run the oldest callback, if any
        pub fn run_one(&self) -> bool {
            let next = self.pending.lock().unwrap().pop_front();
            match next {
                Some(callback) => {
                    callback();
                    true
                }
                None => false,
            }
        }

        /// Simulate the run loop terminating
        pub fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
            self.pending.lock().unwrap().clear();
        }
    }

    impl AffinityContext for ManualContext {
        fn name(&self) -> &str {
            &self.name
        }

        fn post(&self, callback: Callback) -> bool {
            if self.closed.load(Ordering::SeqCst) {
                return false;
            }
            self.pending.lock().unwrap().push_back(callback);
            true
        }

        fn has_access(&self) -> bool {
            thread::current().id() == self.owner
        }
    }
}
