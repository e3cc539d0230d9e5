// Panic isolation for queue execution contexts
use crate::domain::{Action, ActionError};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Result of a panic-guarded execution
#[derive(Debug)]
pub enum PanicGuardResult<T> {
    /// Execution completed
    Success(T),
    /// Execution panicked
    Panicked(String),
}

/// Execute a closure with panic isolation
///
/// A panic is caught and returned as `PanicGuardResult::Panicked`, so the
/// worker thread, pool slot or UI loop running the closure survives it.
///
/// # Example
/// ```text
/// match execute_guarded(|| panic!("test panic")) {
///     PanicGuardResult::Panicked(msg) => assert_eq!(msg, "test panic"),
///     PanicGuardResult::Success(_) => unreachable!(),
/// }
/// ```
pub fn execute_guarded<F, T>(f: F) -> PanicGuardResult<T>
where
    F: FnOnce() -> T,
{
    // Queue state touched by `f` lives behind atomics or is re-validated after
    // a panic, so observing it half-updated is harmless.
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => PanicGuardResult::Success(result),
        Err(payload) => PanicGuardResult::Panicked(panic_message(payload.as_ref())),
    }
}

/// Run one action, folding both its error and a panic into `ActionError`
pub fn run_contained(action: Action) -> Result<(), ActionError> {
    match execute_guarded(move || action.run()) {
        PanicGuardResult::Success(Ok(())) => Ok(()),
        PanicGuardResult::Success(Err(err)) => Err(ActionError::Failed(err)),
        PanicGuardResult::Panicked(msg) => Err(ActionError::Panicked(msg)),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
