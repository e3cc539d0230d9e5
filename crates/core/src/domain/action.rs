// Action - deferred unit of work submitted to a queue

use std::fmt;

/// Boxed error an action may return
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Outcome of running an action
pub type ActionResult = std::result::Result<(), BoxError>;

/// Opaque zero-argument unit of work.
///
/// The queue owns the closure once submitted and runs it at most once; the
/// state the closure captured stays the submitter's business.
pub struct Action {
    run: Box<dyn FnOnce() -> ActionResult + Send + 'static>,
}

impl Action {
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() -> ActionResult + Send + 'static,
    {
        Self { run: Box::new(f) }
    }

    /// Wrap a closure that cannot fail (it may still panic)
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::new(move || {
            f();
            Ok(())
        })
    }

    pub(crate) fn run(self) -> ActionResult {
        (self.run)()
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action").finish_non_exhaustive()
    }
}
