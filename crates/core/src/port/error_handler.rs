// Error Handler Port
// Caller-supplied sink for failures raised by submitted actions

use crate::domain::ActionError;
use tracing::error;

/// Receives every error raised by an action, on the queue's own execution context
///
/// Implementations must not assume which thread they run on; for affinity
/// queues it is the UI context, for the other strategies a worker thread.
pub trait ErrorHandler: Send + Sync {
    fn on_error(&self, error: ActionError);
}

impl<F> ErrorHandler for F
where
    F: Fn(ActionError) + Send + Sync,
{
    fn on_error(&self, error: ActionError) {
        self(error)
    }
}

/// Reports action failures through `tracing`
pub struct LoggingErrorHandler {
    source: String,
}

impl LoggingErrorHandler {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl ErrorHandler for LoggingErrorHandler {
    fn on_error(&self, err: ActionError) {
        error!(
            source = %self.source,
            panicked = err.is_panic(),
            error = %err,
            "Queued action failed"
        );
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::thread::{self, ThreadId};

    /// Records every reported error together with the reporting thread
    #[derive(Default)]
    pub struct RecordingErrorHandler {
        errors: Arc<Mutex<Vec<(ThreadId, String)>>>,
    }

    impl RecordingErrorHandler {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn count(&self) -> usize {
            self.errors.lock().unwrap().len()
        }

        pub fn messages(&self) -> Vec<String> {
            self.errors
                .lock()
                .unwrap()
                .iter()
                .map(|(_, msg)| msg.clone())
                .collect()
        }

        pub fn threads(&self) -> Vec<ThreadId> {
            self.errors.lock().unwrap().iter().map(|(id, _)| *id).collect()
        }
    }

    impl ErrorHandler for RecordingErrorHandler {
        fn on_error(&self, error: ActionError) {
            self.errors
                .lock()
                .unwrap()
                .push((thread::current().id(), error.to_string()));
        }
    }

    /// Panics on every report (for handler isolation testing)
    pub struct PanickingErrorHandler;

    impl ErrorHandler for PanickingErrorHandler {
        fn on_error(&self, error: ActionError) {
            panic!("error handler blew up on: {}", error);
        }
    }
}
